//! Error type for `seatmap-store-sqlite`.

use seatmap_core::ids::EventId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] seatmap_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unrecognised column value: {0}")]
  Decode(String),

  /// The price column is a signed 64-bit integer.
  #[error("booking price {0} does not fit the ledger")]
  PriceOutOfRange(u64),

  /// Attempted to save an inventory that was never created.
  #[error("no inventory stored for event {0}")]
  EventNotFound(EventId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
