//! [`BookingLedger`] implementation over the `bookings` table.

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use seatmap_core::{
  hold::BookingConfirmation,
  ids::HoldId,
  store::{BookingLedger, BookingRecord},
};

use crate::{
  Error, Result,
  encode::{RawBooking, encode_dt, encode_event_id, encode_hold_id, encode_labels},
  store::SqliteStore,
};

const SELECT_BOOKING: &str = "SELECT hold_id, event_id, seats, user_id, price, recorded_at
   FROM bookings WHERE hold_id = ?1";

fn raw_booking(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawBooking> {
  Ok(RawBooking {
    hold_id:     row.get(0)?,
    event_id:    row.get(1)?,
    seats:       row.get(2)?,
    user_id:     row.get(3)?,
    price:       row.get(4)?,
    recorded_at: row.get(5)?,
  })
}

impl BookingLedger for SqliteStore {
  type Error = Error;

  /// Insert unless a booking for the hold already exists, then return
  /// whatever is stored. A retried confirmation therefore never produces a
  /// second row, and the original `recorded_at` is preserved.
  async fn record_booking(
    &self,
    booking: &BookingConfirmation,
  ) -> Result<BookingRecord> {
    let hold_id_str  = encode_hold_id(booking.hold_id);
    let event_id_str = encode_event_id(booking.event_id);
    let seats_str    = encode_labels(&booking.seats)?;
    let user_id      = booking.user_id.clone();
    let price        = i64::try_from(booking.price)
      .map_err(|_| Error::PriceOutOfRange(booking.price))?;
    let at_str       = encode_dt(Utc::now());

    let raw: RawBooking = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO bookings (hold_id, event_id, seats, user_id, price, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(hold_id) DO NOTHING",
          rusqlite::params![
            hold_id_str,
            event_id_str,
            seats_str,
            user_id,
            price,
            at_str,
          ],
        )?;
        let raw =
          tx.query_row(SELECT_BOOKING, rusqlite::params![hold_id_str], raw_booking)?;
        tx.commit()?;
        if inserted == 0 {
          tracing::debug!(hold_id = %hold_id_str, "booking already recorded");
        }
        Ok(raw)
      })
      .await?;

    raw.into_record()
  }

  async fn booking(&self, hold_id: HoldId) -> Result<Option<BookingRecord>> {
    let hold_id_str = encode_hold_id(hold_id);

    let raw: Option<RawBooking> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_BOOKING, rusqlite::params![hold_id_str], raw_booking)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBooking::into_record).transpose()
  }
}
