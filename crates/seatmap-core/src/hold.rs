//! Holds: time-bounded reservations of a batch of seats.
//!
//! A hold starts `Active` and ends in exactly one terminal status. Expiry
//! and confirmation both inspect the hold status before touching any seat,
//! so a timer that fires after a confirmation is a no-op.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::ids::{EventId, HoldId, SeatLabel};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HoldStatus {
  Active,
  Confirmed {
    at:              DateTime<Utc>,
    user_id:         String,
    /// Total price in minor currency units.
    price:           u64,
    /// Whether the booking ledger has acknowledged this confirmation.
    ledger_recorded: bool,
  },
  Expired {
    at: DateTime<Utc>,
  },
  Released {
    at: DateTime<Utc>,
  },
}

impl HoldStatus {
  pub fn kind(&self) -> HoldStatusKind {
    match self {
      Self::Active => HoldStatusKind::Active,
      Self::Confirmed { .. } => HoldStatusKind::Confirmed,
      Self::Expired { .. } => HoldStatusKind::Expired,
      Self::Released { .. } => HoldStatusKind::Released,
    }
  }

  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }

  /// When the hold reached its terminal status.
  pub fn closed_at(&self) -> Option<DateTime<Utc>> {
    match self {
      Self::Active => None,
      Self::Confirmed { at, .. }
      | Self::Expired { at }
      | Self::Released { at } => Some(*at),
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HoldStatusKind {
  Active,
  Confirmed,
  Expired,
  Released,
}

// ─── Hold ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
  pub hold_id:    HoldId,
  /// Seats currently covered by the hold. Shrinks on partial release; once
  /// confirmed it is the set that was booked.
  pub seats:      BTreeSet<SeatLabel>,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub status:     HoldStatus,
}

impl Hold {
  /// An active hold whose expiry has passed but which has not been expired
  /// yet (the timer has not fired or is late).
  pub fn has_lapsed(&self, now: DateTime<Utc>) -> bool {
    self.status.is_active() && now >= self.expires_at
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Returned by a successful hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldReceipt {
  pub event_id:   EventId,
  pub hold_id:    HoldId,
  pub seats:      Vec<SeatLabel>,
  pub expires_at: DateTime<Utc>,
}

/// Returned by a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
  pub event_id:     EventId,
  pub hold_id:      HoldId,
  pub seats:        Vec<SeatLabel>,
  pub user_id:      String,
  pub price:        u64,
  pub confirmed_at: DateTime<Utc>,
}
