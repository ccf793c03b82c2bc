//! Per-seat state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::ids::HoldId;

/// The state of a single seat. The seat map is the only place this lives;
/// booked/reserved sets and counts are always derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeatState {
  Available,
  Reserved {
    hold_id:    HoldId,
    expires_at: DateTime<Utc>,
  },
  Booked {
    /// The hold that was confirmed into this booking.
    hold_id: HoldId,
  },
  /// Administratively disabled.
  Unavailable,
}

impl SeatState {
  pub fn kind(&self) -> SeatStateKind {
    match self {
      Self::Available => SeatStateKind::Available,
      Self::Reserved { .. } => SeatStateKind::Reserved,
      Self::Booked { .. } => SeatStateKind::Booked,
      Self::Unavailable => SeatStateKind::Unavailable,
    }
  }

  /// The hold referencing this seat, for reserved and booked seats.
  pub fn hold_id(&self) -> Option<HoldId> {
    match self {
      Self::Reserved { hold_id, .. } | Self::Booked { hold_id } => {
        Some(*hold_id)
      }
      Self::Available | Self::Unavailable => None,
    }
  }
}

/// Payload-free discriminant of [`SeatState`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeatStateKind {
  Available,
  Reserved,
  Booked,
  Unavailable,
}

/// One seat in the map: its pricing category and current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
  pub category: String,
  pub state:    SeatState,
}
