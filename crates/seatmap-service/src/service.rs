//! [`SeatService`]: per-event coordination around [`SeatInventory`].
//!
//! Each event gets an [`EventSlot`] holding a write mutex and the last
//! committed inventory. Writers serialise on the mutex, apply one
//! state-machine call to a private copy, save it with an optimistic version
//! check and only then publish the copy. Readers clone the published `Arc`
//! and never wait on a writer.

use std::{
  collections::BTreeSet,
  sync::{Arc, Weak},
};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use seatmap_core::{
  audit::{AuditAction, AuditEntry, Transition},
  clock::{Clock, SystemClock},
  hold::{BookingConfirmation, Hold, HoldReceipt, HoldStatus},
  ids::{EventId, HoldId, SeatLabel},
  inventory::{Availability, SeatInventory},
  store::{BookingLedger, BookingRecord, EventCatalog, InventoryStore, SaveOutcome},
};
use tokio::sync::{Mutex, mpsc};

use crate::{
  Error, Result,
  config::{ServiceConfig, seconds},
  scheduler::{ExpiryTask, Scheduler, TokioScheduler},
};

// ─── Results ─────────────────────────────────────────────────────────────────

/// What an expiry attempt found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExpiryOutcome {
  /// The hold lapsed and these seats went back to available.
  Expired { seats: Vec<SeatLabel> },
  /// The hold is still active and runs until `due`.
  NotDue { due: DateTime<Utc> },
  /// The hold was already confirmed, released, expired or pruned.
  NotActive,
}

/// Summary of a [`SeatService::recover`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
  pub events:          usize,
  pub expired:         usize,
  pub rescheduled:     usize,
  pub ledger_repaired: usize,
  /// Events skipped because they could not be loaded or expired.
  pub failed:          usize,
}

// ─── Event slots ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct EventSlot {
  write:    Mutex<()>,
  snapshot: RwLock<Option<Arc<SeatInventory>>>,
}

impl EventSlot {
  fn current(&self) -> Option<Arc<SeatInventory>> { self.snapshot.read().clone() }

  /// Replace the snapshot unless it already holds a newer version.
  fn publish(&self, inventory: Arc<SeatInventory>) {
    let mut snapshot = self.snapshot.write();
    if snapshot
      .as_ref()
      .is_none_or(|current| current.version <= inventory.version)
    {
      *snapshot = Some(inventory);
    }
  }

  fn invalidate(&self) { *self.snapshot.write() = None; }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The seat inventory service. Cloning is cheap and clones share state.
pub struct SeatService<S, L, C> {
  inner: Arc<Inner<S, L, C>>,
}

impl<S, L, C> Clone for SeatService<S, L, C> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

struct Inner<S, L, C> {
  store:     S,
  ledger:    L,
  catalog:   C,
  config:    ServiceConfig,
  clock:     Arc<dyn Clock>,
  scheduler: Arc<dyn Scheduler>,
  slots:     DashMap<EventId, Arc<EventSlot>>,
}

impl<S, L, C> SeatService<S, L, C>
where
  S: InventoryStore + 'static,
  L: BookingLedger + 'static,
  C: EventCatalog + 'static,
{
  /// Build a service on wall-clock time. Must be called inside a tokio
  /// runtime: it spawns the task that handles fired expiry timers.
  pub fn new(store: S, ledger: L, catalog: C, config: ServiceConfig) -> Self {
    Self::with_clock(store, ledger, catalog, config, Arc::new(SystemClock))
  }

  pub fn with_clock(
    store: S,
    ledger: L,
    catalog: C,
    config: ServiceConfig,
    clock: Arc<dyn Clock>,
  ) -> Self {
    let (scheduler, rx) = TokioScheduler::new(Arc::clone(&clock));
    let inner = Arc::new(Inner {
      store,
      ledger,
      catalog,
      config,
      clock,
      scheduler: Arc::new(scheduler),
      slots: DashMap::new(),
    });
    tokio::spawn(expiry_worker(Arc::downgrade(&inner), rx));
    Self { inner }
  }

  pub fn config(&self) -> &ServiceConfig { &self.inner.config }

  /// Expiry timers armed and not yet cancelled.
  pub fn pending_expiries(&self) -> usize { self.inner.scheduler.pending() }

  fn now(&self) -> DateTime<Utc> { self.inner.clock.now() }

  /// The event's slot, creating it if needed. Only for events known to have
  /// a stored inventory: slots are never removed.
  fn slot(&self, event_id: EventId) -> Arc<EventSlot> {
    self.inner.slots.entry(event_id).or_default().value().clone()
  }

  /// The slot of a stored event, loading the inventory on first use. Ids
  /// with no stored inventory get no slot.
  async fn loaded_slot(&self, event_id: EventId) -> Result<Arc<EventSlot>> {
    if let Some(slot) = self.inner.slots.get(&event_id) {
      return Ok(Arc::clone(slot.value()));
    }
    let loaded = self
      .inner
      .store
      .load(event_id)
      .await
      .map_err(Error::store)?
      .ok_or(seatmap_core::Error::EventNotFound(event_id))?;
    let slot = self.slot(event_id);
    slot.publish(Arc::new(loaded));
    Ok(slot)
  }

  #[cfg(test)]
  fn slot_count(&self) -> usize { self.inner.slots.len() }

  /// The published inventory, reloading it from the store after an
  /// invalidation.
  async fn current(
    &self,
    event_id: EventId,
    slot: &EventSlot,
  ) -> Result<Arc<SeatInventory>> {
    if let Some(inventory) = slot.current() {
      return Ok(inventory);
    }
    let loaded = self
      .inner
      .store
      .load(event_id)
      .await
      .map_err(Error::store)?
      .ok_or(seatmap_core::Error::EventNotFound(event_id))?;
    let loaded = Arc::new(loaded);
    slot.publish(Arc::clone(&loaded));
    Ok(slot.current().unwrap_or(loaded))
  }

  /// Run one state-machine step under the event's write lock and persist it.
  ///
  /// `op` runs against a copy of the current inventory; an `Err` discards
  /// the copy. On a version conflict the inventory is reloaded and `op` runs
  /// again, up to `max_save_attempts` times. Terminal holds past the
  /// retention window are pruned on every committed step.
  async fn mutate<T, F>(
    &self,
    event_id: EventId,
    mut op: F,
  ) -> Result<(T, Arc<SeatInventory>)>
  where
    T: Send,
    F: FnMut(
        &mut SeatInventory,
        DateTime<Utc>,
      ) -> seatmap_core::Result<(T, Vec<Transition>)>
      + Send,
  {
    let slot = self.loaded_slot(event_id).await?;
    let _write = slot.write.lock().await;
    let attempts = self.inner.config.max_save_attempts.max(1);
    let retention = self.inner.config.hold_retention();

    for attempt in 1..=attempts {
      let current = self.current(event_id, &slot).await?;
      let now = self.now();

      let mut next = SeatInventory::clone(&current);
      let (value, transitions) = op(&mut next, now)?;
      if next == *current {
        return Ok((value, current));
      }
      if let Some(cutoff) = now.checked_sub_signed(retention) {
        let pruned = next.prune_holds(cutoff);
        if pruned > 0 {
          tracing::debug!(%event_id, pruned, "pruned closed holds");
        }
      }

      let audit: Vec<AuditEntry> = transitions
        .into_iter()
        .map(|t| t.into_entry(event_id, now))
        .collect();

      match self.inner.store.save(&next, audit).await.map_err(Error::store)? {
        SaveOutcome::Saved { version } => {
          next.version = version;
          let next = Arc::new(next);
          slot.publish(Arc::clone(&next));
          return Ok((value, next));
        }
        SaveOutcome::VersionConflict { current: stored } => {
          tracing::warn!(
            %event_id,
            attempt,
            expected = current.version,
            stored,
            "inventory changed underneath us; reloading"
          );
          slot.invalidate();
        }
      }
    }

    Err(Error::Contention { event_id, attempts })
  }

  // ── Creation ──────────────────────────────────────────────────────────────

  /// Create an event's inventory from its catalog plan, all seats available.
  pub async fn create_inventory(
    &self,
    event_id: EventId,
  ) -> Result<Arc<SeatInventory>> {
    let plan = self
      .inner
      .catalog
      .seat_plan(event_id)
      .await
      .map_err(Error::catalog)?
      .ok_or(seatmap_core::Error::EventNotFound(event_id))?;

    let now = self.now();
    let inventory = SeatInventory::new(event_id, &plan, now)?;
    let entry = inventory.creation_transition().into_entry(event_id, now);
    let created = self
      .inner
      .store
      .create(&inventory, vec![entry])
      .await
      .map_err(Error::store)?;
    if !created {
      return Err(seatmap_core::Error::InventoryExists(event_id).into());
    }

    tracing::info!(
      %event_id,
      total_seats = inventory.total_seats(),
      "inventory created"
    );
    let inventory = Arc::new(inventory);
    self.slot(event_id).publish(Arc::clone(&inventory));
    Ok(inventory)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The last committed inventory for an event.
  pub async fn inventory(&self, event_id: EventId) -> Result<Arc<SeatInventory>> {
    let slot = self.loaded_slot(event_id).await?;
    self.current(event_id, &slot).await
  }

  pub async fn available_seats(
    &self,
    event_id: EventId,
  ) -> Result<BTreeSet<SeatLabel>> {
    Ok(self.inventory(event_id).await?.available_seats())
  }

  pub async fn availability(&self, event_id: EventId) -> Result<Availability> {
    Ok(self.inventory(event_id).await?.availability())
  }

  pub async fn hold(&self, event_id: EventId, hold_id: HoldId) -> Result<Hold> {
    self
      .inventory(event_id)
      .await?
      .hold(hold_id)
      .cloned()
      .ok_or_else(|| seatmap_core::Error::HoldNotFound(hold_id).into())
  }

  pub async fn audit_log(&self, event_id: EventId) -> Result<Vec<AuditEntry>> {
    self.inventory(event_id).await?;
    self.inner.store.audit_log(event_id).await.map_err(Error::store)
  }

  pub async fn booking(&self, hold_id: HoldId) -> Result<Option<BookingRecord>> {
    self.inner.ledger.booking(hold_id).await.map_err(Error::ledger)
  }

  // ── Holds ─────────────────────────────────────────────────────────────────

  /// Reserve `labels` for `hold_secs` seconds (the configured default when
  /// `None`) and schedule the hold's expiry.
  pub async fn hold_seats(
    &self,
    event_id: EventId,
    labels: &[SeatLabel],
    hold_secs: Option<u64>,
  ) -> Result<HoldReceipt> {
    let secs = hold_secs.unwrap_or(self.inner.config.default_hold_secs);
    let max = self.inner.config.max_hold_secs;
    if secs == 0 || secs > max {
      return Err(
        seatmap_core::Error::InvalidRequest(format!(
          "hold duration must be between 1 and {max} seconds, got {secs}"
        ))
        .into(),
      );
    }
    let duration: Duration = seconds(secs);

    let ((receipt, expired), _) = self
      .mutate(event_id, |inventory, now| {
        let (receipt, transitions) = inventory.hold_seats(labels, duration, now)?;
        let expired: Vec<HoldId> = transitions
          .iter()
          .filter(|t| t.action == AuditAction::Expired)
          .filter_map(|t| t.hold_id)
          .collect();
        Ok(((receipt, expired), transitions))
      })
      .await?;

    for hold_id in expired {
      self.inner.scheduler.cancel(hold_id);
      tracing::info!(%event_id, %hold_id, "lapsed hold expired by new hold");
    }
    self.inner.scheduler.schedule_at(ExpiryTask {
      event_id,
      hold_id: receipt.hold_id,
      due: receipt.expires_at,
    });
    tracing::info!(
      %event_id,
      hold_id = %receipt.hold_id,
      seats = ?receipt.seats,
      expires_at = %receipt.expires_at,
      "seats held"
    );
    Ok(receipt)
  }

  /// Book `labels` out of an active hold and record the booking in the
  /// ledger. Seats of the hold not listed are released.
  ///
  /// A hold that lapsed before its timer fired is expired here and the call
  /// fails with `HoldExpired`. If the ledger write fails the seats stay
  /// booked; calling again with the same arguments retries the write.
  pub async fn confirm_booking(
    &self,
    event_id: EventId,
    hold_id: HoldId,
    labels: &[SeatLabel],
    user_id: &str,
  ) -> Result<BookingConfirmation> {
    if user_id.trim().is_empty() {
      return Err(
        seatmap_core::Error::InvalidRequest("user id must not be empty".into())
          .into(),
      );
    }

    let confirmed = self
      .mutate(event_id, |inventory, now| {
        inventory.confirm(hold_id, labels, user_id, now)
      })
      .await;

    let (confirmation, inventory) = match confirmed {
      Ok(confirmed) => confirmed,
      Err(Error::Seat(seatmap_core::Error::HoldExpired(expired))) => {
        self.expire_hold(event_id, expired).await?;
        return Err(seatmap_core::Error::HoldExpired(expired).into());
      }
      Err(e) => return Err(e),
    };
    self.inner.scheduler.cancel(hold_id);

    let recorded = inventory.hold(hold_id).is_some_and(|hold| {
      matches!(hold.status, HoldStatus::Confirmed { ledger_recorded: true, .. })
    });
    if !recorded {
      self.record_in_ledger(&confirmation).await?;
    }

    tracing::info!(
      %event_id,
      %hold_id,
      seats = ?confirmation.seats,
      price = confirmation.price,
      "booking confirmed"
    );
    Ok(confirmation)
  }

  /// Write a confirmation to the ledger, then note on the hold that it is
  /// recorded. Failing to persist the note only costs a redundant (and
  /// idempotent) ledger write during recovery.
  async fn record_in_ledger(&self, confirmation: &BookingConfirmation) -> Result<()> {
    let event_id = confirmation.event_id;
    let hold_id = confirmation.hold_id;

    self
      .inner
      .ledger
      .record_booking(confirmation)
      .await
      .map_err(|e| {
        tracing::warn!(%event_id, %hold_id, error = %e, "ledger write failed");
        Error::ledger(e)
      })?;

    let marked = self
      .mutate(event_id, |inventory, _| {
        inventory.mark_ledger_recorded(hold_id);
        Ok(((), Vec::new()))
      })
      .await;
    if let Err(e) = marked {
      tracing::warn!(
        %event_id,
        %hold_id,
        error = %e,
        "could not persist ledger acknowledgement"
      );
    }
    Ok(())
  }

  /// Expire a hold if it is still active and its expiry has passed.
  ///
  /// Safe to call any number of times and from any path (timer, sweep,
  /// confirm): the decision is made under the event's write lock from the
  /// hold's own state.
  pub async fn expire_hold(
    &self,
    event_id: EventId,
    hold_id: HoldId,
  ) -> Result<ExpiryOutcome> {
    let (outcome, _) = self
      .mutate(event_id, |inventory, now| {
        let Some(hold) = inventory.hold(hold_id) else {
          return Ok((ExpiryOutcome::NotActive, Vec::new()));
        };
        if !hold.status.is_active() {
          return Ok((ExpiryOutcome::NotActive, Vec::new()));
        }
        if !hold.has_lapsed(now) {
          let due = hold.expires_at;
          return Ok((ExpiryOutcome::NotDue { due }, Vec::new()));
        }
        Ok(match inventory.expire_hold(hold_id, now) {
          Some(transition) => {
            let seats = transition.seats.clone();
            (ExpiryOutcome::Expired { seats }, vec![transition])
          }
          None => (ExpiryOutcome::NotActive, Vec::new()),
        })
      })
      .await?;

    match &outcome {
      ExpiryOutcome::Expired { seats } => {
        self.inner.scheduler.cancel(hold_id);
        tracing::info!(%event_id, %hold_id, ?seats, "hold expired");
      }
      ExpiryOutcome::NotActive => {
        self.inner.scheduler.cancel(hold_id);
        tracing::debug!(%event_id, %hold_id, "expiry skipped: hold not active");
      }
      ExpiryOutcome::NotDue { due } => {
        tracing::debug!(%event_id, %hold_id, %due, "expiry skipped: not due");
      }
    }
    Ok(outcome)
  }

  async fn on_timer(&self, task: ExpiryTask) {
    match self.expire_hold(task.event_id, task.hold_id).await {
      Ok(ExpiryOutcome::NotDue { due }) => {
        self.inner.scheduler.schedule_at(ExpiryTask { due, ..task });
      }
      Ok(_) => {}
      Err(e) => {
        self.inner.scheduler.cancel(task.hold_id);
        tracing::warn!(
          event_id = %task.event_id,
          hold_id = %task.hold_id,
          error = %e,
          "expiry timer failed; the sweep will retry"
        );
      }
    }
  }

  // ── Release and cancel ────────────────────────────────────────────────────

  /// Return reserved seats to available. Already-available seats are
  /// skipped; returns the seats actually released.
  pub async fn release_seats(
    &self,
    event_id: EventId,
    labels: &[SeatLabel],
  ) -> Result<Vec<SeatLabel>> {
    let (transitions, inventory) = self
      .mutate(event_id, |inventory, now| {
        let transitions = inventory.release_seats(labels, now)?;
        Ok((transitions.clone(), transitions))
      })
      .await?;

    for hold_id in transitions.iter().filter_map(|t| t.hold_id) {
      if inventory.hold(hold_id).is_none_or(|h| !h.status.is_active()) {
        self.inner.scheduler.cancel(hold_id);
      }
    }
    let released: Vec<SeatLabel> =
      transitions.into_iter().flat_map(|t| t.seats).collect();
    if !released.is_empty() {
      tracing::info!(%event_id, seats = ?released, "seats released");
    }
    Ok(released)
  }

  /// Release every seat of a hold. Returns the seats released, empty if the
  /// hold had already expired or been released.
  pub async fn release_hold(
    &self,
    event_id: EventId,
    hold_id: HoldId,
  ) -> Result<Vec<SeatLabel>> {
    let (transition, _) = self
      .mutate(event_id, |inventory, now| {
        let transition = inventory.release_hold(hold_id, now)?;
        Ok((transition.clone(), transition.into_iter().collect()))
      })
      .await?;

    self.inner.scheduler.cancel(hold_id);
    let released = transition.map(|t| t.seats).unwrap_or_default();
    if !released.is_empty() {
      tracing::info!(%event_id, %hold_id, seats = ?released, "hold released");
    }
    Ok(released)
  }

  /// Return booked seats to available.
  pub async fn cancel_booking(
    &self,
    event_id: EventId,
    labels: &[SeatLabel],
  ) -> Result<Vec<SeatLabel>> {
    let (cancelled, _) = self
      .mutate(event_id, |inventory, _| {
        let transitions = inventory.cancel_booking(labels)?;
        let seats = transitions.iter().flat_map(|t| t.seats.clone()).collect();
        Ok((seats, transitions))
      })
      .await?;
    tracing::info!(%event_id, seats = ?cancelled, "booking cancelled");
    Ok(cancelled)
  }

  // ── Administration ────────────────────────────────────────────────────────

  /// Take seats out of service. Returns the seats that changed.
  pub async fn disable_seats(
    &self,
    event_id: EventId,
    labels: &[SeatLabel],
  ) -> Result<Vec<SeatLabel>> {
    let (changed, _) = self
      .mutate(event_id, |inventory, _| {
        let transition = inventory.disable_seats(labels)?;
        Ok(changed_seats(transition))
      })
      .await?;
    tracing::info!(%event_id, seats = ?changed, "seats disabled");
    Ok(changed)
  }

  /// Put disabled seats back into service. Returns the seats that changed.
  pub async fn enable_seats(
    &self,
    event_id: EventId,
    labels: &[SeatLabel],
  ) -> Result<Vec<SeatLabel>> {
    let (changed, _) = self
      .mutate(event_id, |inventory, _| {
        let transition = inventory.enable_seats(labels)?;
        Ok(changed_seats(transition))
      })
      .await?;
    tracing::info!(%event_id, seats = ?changed, "seats enabled");
    Ok(changed)
  }

  /// Stop accepting holds and confirmations for an event. Returns `false` if
  /// it was already inactive.
  pub async fn deactivate(&self, event_id: EventId) -> Result<bool> {
    let (changed, _) = self
      .mutate(event_id, |inventory, _| {
        let transition = inventory.deactivate();
        Ok((transition.is_some(), transition.into_iter().collect()))
      })
      .await?;
    if changed {
      tracing::info!(%event_id, "inventory deactivated");
    }
    Ok(changed)
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  /// Expire every lapsed hold across all stored events. Returns how many
  /// holds were expired. An event that fails is logged and skipped.
  pub async fn sweep_expired(&self) -> Result<usize> {
    let events = self.inner.store.list_events().await.map_err(Error::store)?;
    let mut expired = 0;
    for event_id in events {
      match self.sweep_event(event_id).await {
        Ok(n) => expired += n,
        Err(e) => {
          tracing::warn!(%event_id, error = %e, "sweep skipped event");
        }
      }
    }
    if expired > 0 {
      tracing::info!(expired, "sweep expired lapsed holds");
    }
    Ok(expired)
  }

  async fn sweep_event(&self, event_id: EventId) -> Result<usize> {
    let lapsed = self.inventory(event_id).await?.lapsed_holds(self.now());
    let mut expired = 0;
    for hold_id in lapsed {
      if let ExpiryOutcome::Expired { .. } =
        self.expire_hold(event_id, hold_id).await?
      {
        expired += 1;
      }
    }
    Ok(expired)
  }

  /// Rebuild in-process state after a restart: reload every inventory,
  /// expire holds that lapsed while down, re-arm timers for the rest and
  /// re-send confirmations the ledger never acknowledged. An event that
  /// fails is logged, counted in `failed` and skipped.
  pub async fn recover(&self) -> Result<RecoveryReport> {
    let events = self.inner.store.list_events().await.map_err(Error::store)?;
    let mut report = RecoveryReport::default();

    for event_id in events {
      match self.recover_event(event_id, &mut report).await {
        Ok(()) => report.events += 1,
        Err(e) => {
          report.failed += 1;
          tracing::warn!(%event_id, error = %e, "recovery skipped event");
        }
      }
    }

    tracing::info!(
      events = report.events,
      expired = report.expired,
      rescheduled = report.rescheduled,
      ledger_repaired = report.ledger_repaired,
      failed = report.failed,
      "recovery complete"
    );
    Ok(report)
  }

  async fn recover_event(
    &self,
    event_id: EventId,
    report: &mut RecoveryReport,
  ) -> Result<()> {
    if let Some(slot) = self.inner.slots.get(&event_id) {
      slot.invalidate();
    }
    let inventory = self.inventory(event_id).await?;

    let now = self.now();
    let active: Vec<(HoldId, DateTime<Utc>)> = inventory
      .active_holds()
      .map(|hold| (hold.hold_id, hold.expires_at))
      .collect();
    for (hold_id, due) in active {
      if due <= now {
        if let ExpiryOutcome::Expired { .. } =
          self.expire_hold(event_id, hold_id).await?
        {
          report.expired += 1;
        }
      } else {
        self
          .inner
          .scheduler
          .schedule_at(ExpiryTask { event_id, hold_id, due });
        report.rescheduled += 1;
      }
    }

    for confirmation in inventory.unrecorded_confirmations() {
      match self.record_in_ledger(&confirmation).await {
        Ok(()) => report.ledger_repaired += 1,
        Err(e) => tracing::warn!(
          %event_id,
          hold_id = %confirmation.hold_id,
          error = %e,
          "ledger repair failed"
        ),
      }
    }
    Ok(())
  }
}

fn changed_seats(transition: Option<Transition>) -> (Vec<SeatLabel>, Vec<Transition>) {
  match transition {
    Some(t) => (t.seats.clone(), vec![t]),
    None => (Vec::new(), Vec::new()),
  }
}

/// Handle fired timers until the service is dropped. Holds only a weak
/// reference so pending timers never keep the service alive.
async fn expiry_worker<S, L, C>(
  weak: Weak<Inner<S, L, C>>,
  mut rx: mpsc::UnboundedReceiver<ExpiryTask>,
) where
  S: InventoryStore + 'static,
  L: BookingLedger + 'static,
  C: EventCatalog + 'static,
{
  while let Some(task) = rx.recv().await {
    let Some(inner) = weak.upgrade() else { break };
    let service = SeatService { inner };
    tokio::spawn(async move { service.on_timer(task).await });
  }
}
