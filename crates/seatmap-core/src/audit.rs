//! Audit records for committed seat transitions.
//!
//! Each mutating call on a [`SeatInventory`](crate::inventory::SeatInventory)
//! reports what it changed as a list of [`Transition`]s. The caller persists
//! them alongside the new inventory state so the audit log and the seat map
//! can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::ids::{EventId, HoldId, SeatLabel};

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
pub enum AuditAction {
  Created,
  Held,
  Confirmed,
  Released,
  Expired,
  Cancelled,
  Disabled,
  Enabled,
  Deactivated,
}

/// What one step of a mutation did, before it is stamped with an event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
  pub action:  AuditAction,
  pub hold_id: Option<HoldId>,
  pub seats:   Vec<SeatLabel>,
}

impl Transition {
  pub fn new(
    action: AuditAction,
    hold_id: Option<HoldId>,
    seats: impl IntoIterator<Item = SeatLabel>,
  ) -> Self {
    Self { action, hold_id, seats: seats.into_iter().collect() }
  }

  pub fn into_entry(self, event_id: EventId, at: DateTime<Utc>) -> AuditEntry {
    AuditEntry {
      event_id,
      action: self.action,
      hold_id: self.hold_id,
      seats: self.seats,
      recorded_at: at,
    }
  }
}

/// A persisted audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub event_id:    EventId,
  pub action:      AuditAction,
  pub hold_id:     Option<HoldId>,
  pub seats:       Vec<SeatLabel>,
  pub recorded_at: DateTime<Utc>,
}
