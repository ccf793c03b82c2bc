//! SQLite backend for the seat inventory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] implements both
//! [`InventoryStore`](seatmap_core::store::InventoryStore) and
//! [`BookingLedger`](seatmap_core::store::BookingLedger).

mod encode;
mod ledger;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
