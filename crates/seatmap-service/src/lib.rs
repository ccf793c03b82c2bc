//! Async coordination for the seat inventory.
//!
//! [`SeatService`] wraps any [`InventoryStore`](seatmap_core::store::InventoryStore),
//! [`BookingLedger`](seatmap_core::store::BookingLedger) and
//! [`EventCatalog`](seatmap_core::store::EventCatalog) with per-event write
//! serialisation, lock-free snapshot reads, hold-expiry timers and crash
//! recovery. The `seatmap` binary drives it from the command line.

pub mod catalog;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

pub use catalog::StaticCatalog;
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use service::{ExpiryOutcome, RecoveryReport, SeatService};
