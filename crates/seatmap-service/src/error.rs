//! Service error type.

use seatmap_core::{ErrorKind, ids::EventId};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by a [`SeatService`](crate::SeatService) operation.
#[derive(Debug, Error)]
pub enum Error {
  /// The request was rejected by the seat state machine.
  #[error(transparent)]
  Seat(#[from] seatmap_core::Error),

  /// Every save attempt lost the version race to another writer.
  #[error("event {event_id} still contended after {attempts} save attempts")]
  Contention { event_id: EventId, attempts: u32 },

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  /// The seats were booked but the ledger write failed. Retrying the same
  /// confirmation re-drives the write.
  #[error("booking ledger error: {0}")]
  Ledger(#[source] BoxError),

  #[error("catalog error: {0}")]
  Catalog(#[source] BoxError),
}

impl Error {
  /// The caller-facing classification, for errors that have one.
  /// Collaborator failures are internal and return `None`.
  pub fn kind(&self) -> Option<ErrorKind> {
    match self {
      Self::Seat(e) => Some(e.kind()),
      Self::Contention { .. } => Some(ErrorKind::Conflict),
      Self::Store(_) | Self::Ledger(_) | Self::Catalog(_) => None,
    }
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn ledger(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Ledger(Box::new(e))
  }

  pub(crate) fn catalog(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Catalog(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
