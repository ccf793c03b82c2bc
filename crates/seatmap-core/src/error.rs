//! Error types for `seatmap-core`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  hold::HoldStatusKind,
  ids::{EventId, HoldId, SeatLabel},
  seat::SeatStateKind,
};

/// One seat that was not in the state an operation required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConflict {
  pub label: SeatLabel,
  /// The state the seat was actually found in.
  pub found: SeatStateKind,
}

/// Coarse classification callers use to pick a response.
///
/// `Conflict` means someone else holds the seat or it is in the wrong state;
/// `Expired` means the caller's own hold lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Expired,
  InvalidRequest,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("event not found: {0}")]
  EventNotFound(EventId),

  #[error("hold not found: {0}")]
  HoldNotFound(HoldId),

  #[error("inventory for event {0} already exists")]
  InventoryExists(EventId),

  #[error("event {0} is inactive")]
  Inactive(EventId),

  #[error("seats do not belong to this event: {}", Labels(.0))]
  UnknownSeats(Vec<SeatLabel>),

  #[error("seats not in the required state: {}", Conflicts(.0))]
  SeatConflict(Vec<SeatConflict>),

  #[error("seats not reserved by hold {hold_id}: {}", Labels(.seats))]
  HoldSeatMismatch {
    hold_id: HoldId,
    seats:   Vec<SeatLabel>,
  },

  #[error("hold {0} has expired")]
  HoldExpired(HoldId),

  #[error("hold {hold_id} is {status}")]
  HoldNotActive {
    hold_id: HoldId,
    status:  HoldStatusKind,
  },

  #[error("invalid seat plan: {0}")]
  InvalidPlan(String),

  #[error("invalid request: {0}")]
  InvalidRequest(String),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::EventNotFound(_) | Self::HoldNotFound(_) => ErrorKind::NotFound,
      Self::InventoryExists(_)
      | Self::Inactive(_)
      | Self::SeatConflict(_)
      | Self::HoldSeatMismatch { .. }
      | Self::HoldNotActive { .. } => ErrorKind::Conflict,
      Self::HoldExpired(_) => ErrorKind::Expired,
      Self::UnknownSeats(_) | Self::InvalidPlan(_) | Self::InvalidRequest(_) => {
        ErrorKind::InvalidRequest
      }
    }
  }

  /// The specific labels this error is about, if any.
  pub fn labels(&self) -> Vec<SeatLabel> {
    match self {
      Self::UnknownSeats(labels) => labels.clone(),
      Self::SeatConflict(conflicts) => {
        conflicts.iter().map(|c| c.label.clone()).collect()
      }
      Self::HoldSeatMismatch { seats, .. } => seats.clone(),
      _ => Vec::new(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Display helpers ─────────────────────────────────────────────────────────

struct Labels<'a>(&'a [SeatLabel]);

impl fmt::Display for Labels<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, label) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{label}")?;
    }
    Ok(())
  }
}

struct Conflicts<'a>(&'a [SeatConflict]);

impl fmt::Display for Conflicts<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, c) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{} ({})", c.label, c.found)?;
    }
    Ok(())
  }
}
