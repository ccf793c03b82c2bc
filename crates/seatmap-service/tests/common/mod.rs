//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use std::{
  io,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use seatmap_core::{
  audit::AuditEntry,
  clock::{Clock, ManualClock},
  hold::BookingConfirmation,
  ids::{EventId, HoldId, SeatLabel, parse_labels},
  inventory::SeatInventory,
  plan::SeatPlan,
  store::{BookingLedger, BookingRecord, InventoryStore, SaveOutcome},
};
use seatmap_service::{SeatService, ServiceConfig, StaticCatalog};
use seatmap_store_sqlite::SqliteStore;

pub type Service = SeatService<SqliteStore, SqliteStore, StaticCatalog>;

pub fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap()
}

pub fn labels(raw: &[&str]) -> Vec<SeatLabel> {
  parse_labels(raw.iter().copied()).unwrap()
}

/// Seats A1..A3 at 1000 each.
pub fn small_plan() -> SeatPlan {
  SeatPlan::grid(["A"], 3, "standard", 1000).unwrap()
}

pub struct Fixture {
  pub service:  Service,
  pub store:    SqliteStore,
  pub clock:    ManualClock,
  pub event_id: EventId,
}

impl Fixture {
  /// A service on a manual clock with one created event.
  pub async fn new(plan: SeatPlan, config: ServiceConfig) -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Self::on_store(store, plan, config).await
  }

  pub async fn small() -> Self {
    Self::new(small_plan(), ServiceConfig::default()).await
  }

  pub async fn on_store(
    store: SqliteStore,
    plan: SeatPlan,
    config: ServiceConfig,
  ) -> Self {
    let clock = ManualClock::new(t0());
    let event_id = EventId::new();
    let catalog = StaticCatalog::new().with_plan(event_id, plan);
    let service = SeatService::with_clock(
      store.clone(),
      store.clone(),
      catalog,
      config,
      Arc::new(clock.clone()),
    );
    service.create_inventory(event_id).await.unwrap();
    Self { service, store, clock, event_id }
  }

  /// Another service over the same store and event, sharing the clock.
  pub fn sibling(&self, config: ServiceConfig) -> Service {
    SeatService::with_clock(
      self.store.clone(),
      self.store.clone(),
      StaticCatalog::new(),
      config,
      Arc::new(self.clock.clone()) as Arc<dyn Clock>,
    )
  }

  pub async fn available(&self) -> usize {
    self.service.availability(self.event_id).await.unwrap().available
  }

  pub async fn assert_invariants(&self) {
    let inventory = self.service.inventory(self.event_id).await.unwrap();
    inventory.check_invariants().unwrap();
  }
}

// ─── Ledger double ───────────────────────────────────────────────────────────

/// A ledger over SQLite that can be switched off to simulate an outage.
#[derive(Clone)]
pub struct FlakyLedger {
  inner:   SqliteStore,
  offline: Arc<AtomicBool>,
}

impl FlakyLedger {
  pub fn new(inner: SqliteStore) -> Self {
    Self { inner, offline: Arc::new(AtomicBool::new(false)) }
  }

  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }
}

impl BookingLedger for FlakyLedger {
  type Error = io::Error;

  async fn record_booking(
    &self,
    booking: &BookingConfirmation,
  ) -> Result<BookingRecord, io::Error> {
    if self.offline.load(Ordering::SeqCst) {
      return Err(io::Error::other("ledger offline"));
    }
    self.inner.record_booking(booking).await.map_err(io::Error::other)
  }

  async fn booking(&self, hold_id: HoldId) -> Result<Option<BookingRecord>, io::Error> {
    self.inner.booking(hold_id).await.map_err(io::Error::other)
  }
}

// ─── Store double ────────────────────────────────────────────────────────────

/// An inventory store over SQLite where one event's record can be made
/// unreadable and unwritable, as if its row were corrupt.
#[derive(Clone)]
pub struct BrokenStore {
  inner:  SqliteStore,
  broken: Arc<RwLock<Option<EventId>>>,
}

impl BrokenStore {
  pub fn new(inner: SqliteStore) -> Self {
    Self { inner, broken: Arc::new(RwLock::new(None)) }
  }

  pub fn break_event(&self, event_id: EventId) {
    *self.broken.write() = Some(event_id);
  }

  pub fn heal(&self) { *self.broken.write() = None; }

  fn check(&self, event_id: EventId) -> Result<(), io::Error> {
    if *self.broken.read() == Some(event_id) {
      return Err(io::Error::other(format!("record for {event_id} is corrupt")));
    }
    Ok(())
  }
}

impl InventoryStore for BrokenStore {
  type Error = io::Error;

  async fn create(
    &self,
    inventory: &SeatInventory,
    audit: Vec<AuditEntry>,
  ) -> Result<bool, io::Error> {
    self.inner.create(inventory, audit).await.map_err(io::Error::other)
  }

  async fn load(&self, event_id: EventId) -> Result<Option<SeatInventory>, io::Error> {
    self.check(event_id)?;
    self.inner.load(event_id).await.map_err(io::Error::other)
  }

  async fn save(
    &self,
    inventory: &SeatInventory,
    audit: Vec<AuditEntry>,
  ) -> Result<SaveOutcome, io::Error> {
    self.check(inventory.event_id)?;
    self.inner.save(inventory, audit).await.map_err(io::Error::other)
  }

  async fn list_events(&self) -> Result<Vec<EventId>, io::Error> {
    self.inner.list_events().await.map_err(io::Error::other)
  }

  async fn audit_log(&self, event_id: EventId) -> Result<Vec<AuditEntry>, io::Error> {
    self.inner.audit_log(event_id).await.map_err(io::Error::other)
  }
}
