//! Collaborator traits: persistence, the booking ledger and the catalog.
//!
//! Backends (e.g. `seatmap-store-sqlite`) implement these. The service layer
//! depends on the abstractions, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  audit::AuditEntry,
  hold::BookingConfirmation,
  ids::{EventId, HoldId, SeatLabel},
  inventory::SeatInventory,
  plan::SeatPlan,
};

// ─── Inventory persistence ───────────────────────────────────────────────────

/// Result of an optimistic save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
  /// Written; the record is now at `version`.
  Saved { version: u64 },
  /// Someone else wrote first. Nothing was written.
  VersionConflict { current: u64 },
}

/// Durable home of one record per event.
///
/// Writes are optimistic: [`InventoryStore::save`] succeeds only if the
/// stored version still equals `inventory.version`, and the audit entries are
/// appended in the same transaction as the record update.
pub trait InventoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a freshly created inventory at version 0. Returns `false` if a
  /// record for the event already exists.
  fn create<'a>(
    &'a self,
    inventory: &'a SeatInventory,
    audit: Vec<AuditEntry>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Load the current record for an event. Returns `None` if not found.
  fn load(
    &self,
    event_id: EventId,
  ) -> impl Future<Output = Result<Option<SeatInventory>, Self::Error>> + Send + '_;

  /// Replace the record if its stored version equals `inventory.version`.
  fn save<'a>(
    &'a self,
    inventory: &'a SeatInventory,
    audit: Vec<AuditEntry>,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + 'a;

  /// Every event with an inventory record.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<EventId>, Self::Error>> + Send + '_;

  /// The audit trail for an event, oldest first.
  fn audit_log(
    &self,
    event_id: EventId,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}

// ─── Booking ledger ──────────────────────────────────────────────────────────

/// A finalized booking as the ledger stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
  pub event_id:    EventId,
  pub hold_id:     HoldId,
  pub seats:       Vec<SeatLabel>,
  pub user_id:     String,
  pub price:       u64,
  pub recorded_at: DateTime<Utc>,
}

/// Records confirmed bookings.
///
/// `record_booking` must be idempotent on `hold_id`: recording the same hold
/// twice returns the first record and writes nothing.
pub trait BookingLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn record_booking<'a>(
    &'a self,
    booking: &'a BookingConfirmation,
  ) -> impl Future<Output = Result<BookingRecord, Self::Error>> + Send + 'a;

  fn booking(
    &self,
    hold_id: HoldId,
  ) -> impl Future<Output = Result<Option<BookingRecord>, Self::Error>> + Send + '_;
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Read-only source of seat plans, consulted when an inventory is created.
pub trait EventCatalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The plan for an event. Returns `None` for unknown events.
  fn seat_plan(
    &self,
    event_id: EventId,
  ) -> impl Future<Output = Result<Option<SeatPlan>, Self::Error>> + Send + '_;
}
