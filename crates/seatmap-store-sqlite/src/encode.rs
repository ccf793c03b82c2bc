//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! seat label lists and whole inventory records are compact JSON.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use seatmap_core::{
  audit::{AuditAction, AuditEntry},
  ids::{EventId, HoldId, SeatLabel},
  inventory::SeatInventory,
  store::BookingRecord,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_event_id(id: EventId) -> String { encode_uuid(id.0) }

pub fn decode_event_id(s: &str) -> Result<EventId> {
  decode_uuid(s).map(EventId)
}

pub fn encode_hold_id(id: HoldId) -> String { encode_uuid(id.0) }

pub fn decode_hold_id(s: &str) -> Result<HoldId> { decode_uuid(s).map(HoldId) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AuditAction ─────────────────────────────────────────────────────────────

pub fn encode_action(a: AuditAction) -> &'static str {
  match a {
    AuditAction::Created => "created",
    AuditAction::Held => "held",
    AuditAction::Confirmed => "confirmed",
    AuditAction::Released => "released",
    AuditAction::Expired => "expired",
    AuditAction::Cancelled => "cancelled",
    AuditAction::Disabled => "disabled",
    AuditAction::Enabled => "enabled",
    AuditAction::Deactivated => "deactivated",
  }
}

pub fn decode_action(s: &str) -> Result<AuditAction> {
  AuditAction::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown audit action: {s:?}")))
}

// ─── Seat labels ─────────────────────────────────────────────────────────────

pub fn encode_labels(labels: &[SeatLabel]) -> Result<String> {
  Ok(serde_json::to_string(labels)?)
}

pub fn decode_labels(s: &str) -> Result<Vec<SeatLabel>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Inventory records ───────────────────────────────────────────────────────

pub fn encode_inventory(inventory: &SeatInventory) -> Result<String> {
  Ok(serde_json::to_string(inventory)?)
}

/// Decode `record_json`, trusting the `version` column over the embedded
/// copy.
pub fn decode_inventory(version: i64, json: &str) -> Result<SeatInventory> {
  let mut inventory: SeatInventory = serde_json::from_str(json)?;
  inventory.version = u64::try_from(version)
    .map_err(|_| Error::Decode(format!("negative version {version}")))?;
  Ok(inventory)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `inventory_audit` row.
pub struct RawAuditEntry {
  pub event_id:    String,
  pub action:      String,
  pub hold_id:     Option<String>,
  pub seats:       String,
  pub recorded_at: String,
}

impl RawAuditEntry {
  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      event_id:    decode_event_id(&self.event_id)?,
      action:      decode_action(&self.action)?,
      hold_id:     self.hold_id.as_deref().map(decode_hold_id).transpose()?,
      seats:       decode_labels(&self.seats)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw values read directly from a `bookings` row.
pub struct RawBooking {
  pub hold_id:     String,
  pub event_id:    String,
  pub seats:       String,
  pub user_id:     String,
  pub price:       i64,
  pub recorded_at: String,
}

impl RawBooking {
  pub fn into_record(self) -> Result<BookingRecord> {
    Ok(BookingRecord {
      event_id:    decode_event_id(&self.event_id)?,
      hold_id:     decode_hold_id(&self.hold_id)?,
      seats:       decode_labels(&self.seats)?,
      user_id:     self.user_id,
      price:       u64::try_from(self.price)
        .map_err(|_| Error::Decode(format!("negative price {}", self.price)))?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
