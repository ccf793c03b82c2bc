//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use seatmap_core::{
  audit::{AuditAction, Transition},
  hold::BookingConfirmation,
  ids::{EventId, HoldId, SeatLabel, parse_labels},
  inventory::SeatInventory,
  plan::SeatPlan,
  seat::SeatStateKind,
  store::{BookingLedger, InventoryStore, SaveOutcome},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn inventory() -> SeatInventory {
  let plan = SeatPlan::grid(["A", "B"], 3, "standard", 1100).unwrap();
  SeatInventory::new(EventId::new(), &plan, Utc::now()).unwrap()
}

fn labels(raw: &[&str]) -> Vec<SeatLabel> {
  parse_labels(raw.iter().copied()).unwrap()
}

async fn create(s: &SqliteStore, inv: &SeatInventory) {
  let entry = inv.creation_transition().into_entry(inv.event_id, Utc::now());
  assert!(s.create(inv, vec![entry]).await.unwrap());
}

// ─── Inventories ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_load_inventory() {
  let s = store().await;
  let inv = inventory();
  create(&s, &inv).await;

  let loaded = s.load(inv.event_id).await.unwrap().unwrap();
  assert_eq!(loaded, inv);
  assert_eq!(loaded.version, 0);
  assert_eq!(loaded.total_seats(), 6);
}

#[tokio::test]
async fn create_twice_reports_existing() {
  let s = store().await;
  let inv = inventory();
  create(&s, &inv).await;

  assert!(!s.create(&inv, Vec::new()).await.unwrap());
  // The rejected create must not have appended audit rows.
  assert_eq!(s.audit_log(inv.event_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_missing_returns_none() {
  let s = store().await;
  assert!(s.load(EventId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn save_bumps_version_and_persists_seat_states() {
  let s = store().await;
  let mut inv = inventory();
  create(&s, &inv).await;

  let (receipt, transitions) = inv
    .hold_seats(&labels(&["A1", "B2"]), Duration::minutes(15), Utc::now())
    .unwrap();
  let audit = transitions
    .into_iter()
    .map(|t| t.into_entry(inv.event_id, Utc::now()))
    .collect();
  let outcome = s.save(&inv, audit).await.unwrap();
  assert_eq!(outcome, SaveOutcome::Saved { version: 1 });

  let loaded = s.load(inv.event_id).await.unwrap().unwrap();
  assert_eq!(loaded.version, 1);
  assert_eq!(
    loaded.seat(&labels(&["A1"])[0]).unwrap().state.kind(),
    SeatStateKind::Reserved
  );
  assert!(loaded.hold(receipt.hold_id).unwrap().status.is_active());
  assert_eq!(loaded.availability().available, 4);
}

#[tokio::test]
async fn stale_save_is_rejected() {
  let s = store().await;
  let inv = inventory();
  create(&s, &inv).await;

  let mut first = inv.clone();
  first
    .hold_seats(&labels(&["A1"]), Duration::minutes(5), Utc::now())
    .unwrap();
  let mut second = inv.clone();
  second
    .hold_seats(&labels(&["A1"]), Duration::minutes(5), Utc::now())
    .unwrap();

  assert_eq!(
    s.save(&first, Vec::new()).await.unwrap(),
    SaveOutcome::Saved { version: 1 }
  );
  assert_eq!(
    s.save(&second, Vec::new()).await.unwrap(),
    SaveOutcome::VersionConflict { current: 1 }
  );

  // The winner's hold is what is stored.
  let loaded = s.load(inv.event_id).await.unwrap().unwrap();
  assert_eq!(loaded.active_holds().count(), 1);
  assert_eq!(loaded.holds().next().unwrap().hold_id, first.holds().next().unwrap().hold_id);
}

#[tokio::test]
async fn save_unknown_event_errors() {
  let s = store().await;
  let inv = inventory();
  let err = s.save(&inv, Vec::new()).await.unwrap_err();
  assert!(matches!(err, crate::Error::EventNotFound(id) if id == inv.event_id));
}

#[tokio::test]
async fn list_events_returns_all_records() {
  let s = store().await;
  let a = inventory();
  let b = inventory();
  create(&s, &a).await;
  create(&s, &b).await;

  let ids = s.list_events().await.unwrap();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains(&a.event_id) && ids.contains(&b.event_id));
}

// ─── Audit log ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_log_is_ordered_and_typed() {
  let s = store().await;
  let inv = inventory();
  create(&s, &inv).await;

  let hold_id = HoldId::new();
  let entries = vec![
    Transition::new(AuditAction::Held, Some(hold_id), labels(&["A1", "A2"]))
      .into_entry(inv.event_id, Utc::now()),
    Transition::new(AuditAction::Released, Some(hold_id), labels(&["A2"]))
      .into_entry(inv.event_id, Utc::now()),
  ];
  s.save(&inv, entries).await.unwrap();

  let log = s.audit_log(inv.event_id).await.unwrap();
  let actions: Vec<_> = log.iter().map(|e| e.action).collect();
  assert_eq!(actions, [
    AuditAction::Created,
    AuditAction::Held,
    AuditAction::Released
  ]);
  assert_eq!(log[1].hold_id, Some(hold_id));
  assert_eq!(log[2].seats, labels(&["A2"]));
}

#[tokio::test]
async fn conflicting_save_writes_no_audit() {
  let s = store().await;
  let mut inv = inventory();
  create(&s, &inv).await;
  s.save(&inv, Vec::new()).await.unwrap();

  inv.version = 0;
  let entry = Transition::new(AuditAction::Disabled, None, labels(&["A1"]))
    .into_entry(inv.event_id, Utc::now());
  let outcome = s.save(&inv, vec![entry]).await.unwrap();
  assert!(matches!(outcome, SaveOutcome::VersionConflict { .. }));
  assert_eq!(s.audit_log(inv.event_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_record_fails_only_its_own_load() {
  let s = store().await;
  let broken = inventory();
  let healthy = inventory();
  create(&s, &broken).await;
  create(&s, &healthy).await;

  let event_id = crate::encode::encode_event_id(broken.event_id);
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE inventories SET record_json = '{\"seats\": 7}' WHERE event_id = ?1",
        rusqlite::params![event_id],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(matches!(s.load(broken.event_id).await, Err(Error::Json(_))));
  assert_eq!(s.load(healthy.event_id).await.unwrap().unwrap(), healthy);
  assert_eq!(s.list_events().await.unwrap().len(), 2);
}

// ─── Booking ledger ──────────────────────────────────────────────────────────

#[tokio::test]
async fn record_booking_is_idempotent_on_hold_id() {
  let s = store().await;
  let mut inv = inventory();
  let now = Utc::now();
  let (receipt, _) = inv
    .hold_seats(&labels(&["A1", "A2"]), Duration::minutes(5), now)
    .unwrap();
  let (confirmation, _) = inv
    .confirm(receipt.hold_id, &labels(&["A1", "A2"]), "user-7", now)
    .unwrap();

  let first = s.record_booking(&confirmation).await.unwrap();
  assert_eq!(first.price, 2200);
  assert_eq!(first.user_id, "user-7");
  assert_eq!(first.seats, labels(&["A1", "A2"]));

  let again = s.record_booking(&confirmation).await.unwrap();
  assert_eq!(again, first);

  let fetched = s.booking(receipt.hold_id).await.unwrap().unwrap();
  assert_eq!(fetched, first);
}

#[tokio::test]
async fn record_booking_rejects_price_beyond_column_range() {
  let s = store().await;
  let confirmation = BookingConfirmation {
    event_id:     EventId::new(),
    hold_id:      HoldId::new(),
    seats:        labels(&["A1"]),
    user_id:      "user-7".into(),
    price:        i64::MAX as u64 + 1,
    confirmed_at: Utc::now(),
  };

  let err = s.record_booking(&confirmation).await.unwrap_err();
  assert!(matches!(err, Error::PriceOutOfRange(p) if p == confirmation.price));
  assert!(s.booking(confirmation.hold_id).await.unwrap().is_none());
}

#[tokio::test]
async fn booking_missing_returns_none() {
  let s = store().await;
  assert!(s.booking(HoldId::new()).await.unwrap().is_none());
}
