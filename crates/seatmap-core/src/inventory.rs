//! [`SeatInventory`]: the seat map and hold table for one event.
//!
//! Every method here is synchronous and all-or-nothing: it validates the
//! whole request before touching a seat, so an `Err` always leaves the
//! inventory exactly as it was. Serialising concurrent callers and
//! persisting the result is the service layer's job.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  audit::{AuditAction, Transition},
  error::SeatConflict,
  hold::{BookingConfirmation, Hold, HoldReceipt, HoldStatus},
  ids::{EventId, HoldId, SeatLabel},
  plan::{MAX_PRICE, SeatPlan},
  seat::{Seat, SeatState, SeatStateKind},
};

// ─── Availability summary ────────────────────────────────────────────────────

/// Seat counts derived from the seat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
  pub total:       usize,
  pub available:   usize,
  pub reserved:    usize,
  pub booked:      usize,
  pub unavailable: usize,
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInventory {
  pub event_id:   EventId,
  /// Optimistic-concurrency version; bumped by the store on every save.
  pub version:    u64,
  pub created_at: DateTime<Utc>,
  active:         bool,
  seats:          BTreeMap<SeatLabel, Seat>,
  pricing:        BTreeMap<String, u64>,
  holds:          BTreeMap<HoldId, Hold>,
}

impl SeatInventory {
  /// Build a fresh inventory from a catalog plan. All seats start available.
  pub fn new(
    event_id: EventId,
    plan: &SeatPlan,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    plan.validate()?;

    let seats = plan
      .seats
      .iter()
      .map(|s| {
        (s.label.clone(), Seat {
          category: s.category.clone(),
          state:    SeatState::Available,
        })
      })
      .collect();

    Ok(Self {
      event_id,
      version: 0,
      created_at: now,
      active: true,
      seats,
      pricing: plan.pricing.clone(),
      holds: BTreeMap::new(),
    })
  }

  /// The audit record for creation.
  pub fn creation_transition(&self) -> Transition {
    Transition::new(AuditAction::Created, None, self.seats.keys().cloned())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn is_active(&self) -> bool { self.active }

  pub fn total_seats(&self) -> usize { self.seats.len() }

  pub fn seat(&self, label: &SeatLabel) -> Option<&Seat> {
    self.seats.get(label)
  }

  pub fn price_of(&self, category: &str) -> Option<u64> {
    self.pricing.get(category).copied()
  }

  pub fn available_seats(&self) -> BTreeSet<SeatLabel> {
    self.labels_in(SeatStateKind::Available)
  }

  pub fn booked_seats(&self) -> BTreeSet<SeatLabel> {
    self.labels_in(SeatStateKind::Booked)
  }

  /// Reserved seats with their hold expiry.
  pub fn reserved_seats(&self) -> BTreeMap<SeatLabel, DateTime<Utc>> {
    self
      .seats
      .iter()
      .filter_map(|(label, seat)| match seat.state {
        SeatState::Reserved { expires_at, .. } => {
          Some((label.clone(), expires_at))
        }
        _ => None,
      })
      .collect()
  }

  pub fn availability(&self) -> Availability {
    let mut counts = Availability {
      total:       self.seats.len(),
      available:   0,
      reserved:    0,
      booked:      0,
      unavailable: 0,
    };
    for seat in self.seats.values() {
      match seat.state.kind() {
        SeatStateKind::Available => counts.available += 1,
        SeatStateKind::Reserved => counts.reserved += 1,
        SeatStateKind::Booked => counts.booked += 1,
        SeatStateKind::Unavailable => counts.unavailable += 1,
      }
    }
    counts
  }

  pub fn hold(&self, hold_id: HoldId) -> Option<&Hold> {
    self.holds.get(&hold_id)
  }

  pub fn holds(&self) -> impl Iterator<Item = &Hold> { self.holds.values() }

  pub fn active_holds(&self) -> impl Iterator<Item = &Hold> {
    self.holds.values().filter(|h| h.status.is_active())
  }

  /// Active holds whose expiry is at or before `now`.
  pub fn lapsed_holds(&self, now: DateTime<Utc>) -> Vec<HoldId> {
    self
      .holds
      .values()
      .filter(|h| h.has_lapsed(now))
      .map(|h| h.hold_id)
      .collect()
  }

  /// Confirmed holds the booking ledger has not acknowledged yet.
  pub fn unrecorded_confirmations(&self) -> Vec<BookingConfirmation> {
    self
      .holds
      .values()
      .filter_map(|h| match &h.status {
        HoldStatus::Confirmed { ledger_recorded: false, .. } => {
          self.confirmation_for(h)
        }
        _ => None,
      })
      .collect()
  }

  fn labels_in(&self, kind: SeatStateKind) -> BTreeSet<SeatLabel> {
    self
      .seats
      .iter()
      .filter(|(_, seat)| seat.state.kind() == kind)
      .map(|(label, _)| label.clone())
      .collect()
  }

  fn confirmation_for(&self, hold: &Hold) -> Option<BookingConfirmation> {
    match &hold.status {
      HoldStatus::Confirmed { at, user_id, price, .. } => {
        Some(BookingConfirmation {
          event_id:     self.event_id,
          hold_id:      hold.hold_id,
          seats:        hold.seats.iter().cloned().collect(),
          user_id:      user_id.clone(),
          price:        *price,
          confirmed_at: *at,
        })
      }
      _ => None,
    }
  }

  // ── Request validation ────────────────────────────────────────────────────

  /// Reject empty or duplicated label lists and labels outside this event.
  fn requested_set(&self, labels: &[SeatLabel]) -> Result<BTreeSet<SeatLabel>> {
    if labels.is_empty() {
      return Err(Error::InvalidRequest("no seats requested".into()));
    }

    let set: BTreeSet<SeatLabel> = labels.iter().cloned().collect();
    if set.len() != labels.len() {
      return Err(Error::InvalidRequest(
        "seat label requested more than once".into(),
      ));
    }

    let unknown: Vec<SeatLabel> = set
      .iter()
      .filter(|label| !self.seats.contains_key(*label))
      .cloned()
      .collect();
    if !unknown.is_empty() {
      return Err(Error::UnknownSeats(unknown));
    }

    Ok(set)
  }

  /// Every requested seat whose state is not in `allowed`.
  fn conflicts(
    &self,
    set: &BTreeSet<SeatLabel>,
    allowed: &[SeatStateKind],
  ) -> Vec<SeatConflict> {
    set
      .iter()
      .filter_map(|label| {
        let found = self.seats.get(label)?.state.kind();
        (!allowed.contains(&found)).then(|| SeatConflict {
          label: label.clone(),
          found,
        })
      })
      .collect()
  }

  fn set_state(&mut self, label: &SeatLabel, state: SeatState) {
    if let Some(seat) = self.seats.get_mut(label) {
      seat.state = state;
    }
  }

  // ── Holds ─────────────────────────────────────────────────────────────────

  /// Reserve every seat in `labels` under a new hold, or none of them.
  ///
  /// Seats still reserved by a hold that lapsed before its timer fired are
  /// not conflicts: that hold is expired in the same step and its
  /// `Expired` transition precedes the `Held` one.
  pub fn hold_seats(
    &mut self,
    labels: &[SeatLabel],
    duration: Duration,
    now: DateTime<Utc>,
  ) -> Result<(HoldReceipt, Vec<Transition>)> {
    if !self.active {
      return Err(Error::Inactive(self.event_id));
    }
    if duration <= Duration::zero() {
      return Err(Error::InvalidRequest(
        "hold duration must be positive".into(),
      ));
    }

    let set = self.requested_set(labels)?;
    let lapsed = self.lapsed_holds_covering(&set, now);
    let conflicts: Vec<SeatConflict> = self
      .conflicts(&set, &[SeatStateKind::Available])
      .into_iter()
      .filter(|conflict| {
        self
          .seats
          .get(&conflict.label)
          .and_then(|seat| seat.state.hold_id())
          .is_none_or(|hold_id| !lapsed.contains(&hold_id))
      })
      .collect();
    if !conflicts.is_empty() {
      return Err(Error::SeatConflict(conflicts));
    }

    let mut transitions: Vec<Transition> = lapsed
      .iter()
      .filter_map(|hold_id| self.expire_hold(*hold_id, now))
      .collect();

    let hold_id = HoldId::new();
    let expires_at = now + duration;
    for label in &set {
      self.set_state(label, SeatState::Reserved { hold_id, expires_at });
    }
    self.holds.insert(hold_id, Hold {
      hold_id,
      seats: set.clone(),
      created_at: now,
      expires_at,
      status: HoldStatus::Active,
    });

    let receipt = HoldReceipt {
      event_id: self.event_id,
      hold_id,
      seats: set.iter().cloned().collect(),
      expires_at,
    };
    transitions.push(Transition::new(AuditAction::Held, Some(hold_id), set));
    Ok((receipt, transitions))
  }

  /// Active holds past their expiry that still reserve any of `set`.
  fn lapsed_holds_covering(
    &self,
    set: &BTreeSet<SeatLabel>,
    now: DateTime<Utc>,
  ) -> BTreeSet<HoldId> {
    set
      .iter()
      .filter_map(|label| self.seats.get(label)?.state.hold_id())
      .filter(|hold_id| {
        self.holds.get(hold_id).is_some_and(|hold| hold.has_lapsed(now))
      })
      .collect()
  }

  /// Turn an active hold into a booking for `labels`.
  ///
  /// `labels` may be a subset of the hold; the rest of the hold is released
  /// in the same step. Confirming an already-confirmed hold with the same
  /// seats returns the original confirmation and changes nothing, so callers
  /// can retry after a failed ledger write.
  pub fn confirm(
    &mut self,
    hold_id: HoldId,
    labels: &[SeatLabel],
    user_id: &str,
    now: DateTime<Utc>,
  ) -> Result<(BookingConfirmation, Vec<Transition>)> {
    let hold = self.holds.get(&hold_id).ok_or(Error::HoldNotFound(hold_id))?;

    match &hold.status {
      HoldStatus::Active => {}
      HoldStatus::Expired { .. } => return Err(Error::HoldExpired(hold_id)),
      HoldStatus::Confirmed { .. } => {
        let requested: BTreeSet<&SeatLabel> = labels.iter().collect();
        let still_booked = hold.seats.iter().all(|label| {
          self.seats.get(label).map(|s| &s.state)
            == Some(&SeatState::Booked { hold_id })
        });
        if still_booked
          && requested.len() == hold.seats.len()
          && hold.seats.iter().all(|l| requested.contains(l))
          && let Some(confirmation) = self.confirmation_for(hold)
        {
          return Ok((confirmation, Vec::new()));
        }
        return Err(Error::HoldNotActive {
          hold_id,
          status: hold.status.kind(),
        });
      }
      HoldStatus::Released { .. } => {
        return Err(Error::HoldNotActive {
          hold_id,
          status: hold.status.kind(),
        });
      }
    }

    if !self.active {
      return Err(Error::Inactive(self.event_id));
    }
    // The timer may not have fired yet; a lapsed hold is expired regardless.
    if hold.has_lapsed(now) {
      return Err(Error::HoldExpired(hold_id));
    }

    if labels.is_empty() {
      return Err(Error::InvalidRequest("no seats to confirm".into()));
    }
    let requested: BTreeSet<SeatLabel> = labels.iter().cloned().collect();
    if requested.len() != labels.len() {
      return Err(Error::InvalidRequest(
        "seat label requested more than once".into(),
      ));
    }
    let mismatched: Vec<SeatLabel> = requested
      .iter()
      .filter(|label| !hold.seats.contains(*label))
      .cloned()
      .collect();
    if !mismatched.is_empty() {
      return Err(Error::HoldSeatMismatch { hold_id, seats: mismatched });
    }

    let leftover: Vec<SeatLabel> =
      hold.seats.difference(&requested).cloned().collect();
    let price = requested
      .iter()
      .filter_map(|label| self.seats.get(label))
      .filter_map(|seat| self.price_of(&seat.category))
      .try_fold(0u64, |total, price| total.checked_add(price))
      .filter(|total| *total <= MAX_PRICE)
      .ok_or_else(|| {
        Error::InvalidRequest(format!(
          "booking price exceeds {MAX_PRICE}; confirm fewer seats"
        ))
      })?;

    for label in &requested {
      self.set_state(label, SeatState::Booked { hold_id });
    }
    for label in &leftover {
      self.set_state(label, SeatState::Available);
    }

    let status = HoldStatus::Confirmed {
      at: now,
      user_id: user_id.to_owned(),
      price,
      ledger_recorded: false,
    };
    if let Some(hold) = self.holds.get_mut(&hold_id) {
      hold.seats = requested.clone();
      hold.status = status;
    }

    let mut transitions =
      vec![Transition::new(AuditAction::Confirmed, Some(hold_id), requested)];
    if !leftover.is_empty() {
      transitions.push(Transition::new(
        AuditAction::Released,
        Some(hold_id),
        leftover,
      ));
    }

    let confirmation = self
      .holds
      .get(&hold_id)
      .and_then(|h| self.confirmation_for(h))
      .ok_or(Error::HoldNotFound(hold_id))?;
    Ok((confirmation, transitions))
  }

  /// Expire an active hold, returning its seats to available.
  ///
  /// Decided purely on hold status: a hold that was confirmed, released or
  /// already expired (or pruned) yields `None` and touches nothing. This is
  /// what makes a late timer harmless.
  pub fn expire_hold(
    &mut self,
    hold_id: HoldId,
    now: DateTime<Utc>,
  ) -> Option<Transition> {
    let hold = self.holds.get_mut(&hold_id)?;
    if !hold.status.is_active() {
      return None;
    }
    hold.status = HoldStatus::Expired { at: now };
    let seats: Vec<SeatLabel> = hold.seats.iter().cloned().collect();

    let mut freed = Vec::new();
    for label in seats {
      if let Some(seat) = self.seats.get_mut(&label)
        && matches!(seat.state, SeatState::Reserved { hold_id: h, .. } if h == hold_id)
      {
        seat.state = SeatState::Available;
        freed.push(label);
      }
    }
    Some(Transition::new(AuditAction::Expired, Some(hold_id), freed))
  }

  /// Release every seat of a hold. Releasing a hold that already expired or
  /// was released is a no-op; a confirmed hold cannot be released.
  pub fn release_hold(
    &mut self,
    hold_id: HoldId,
    now: DateTime<Utc>,
  ) -> Result<Option<Transition>> {
    let hold = self.holds.get(&hold_id).ok_or(Error::HoldNotFound(hold_id))?;
    match hold.status {
      HoldStatus::Active => {}
      HoldStatus::Expired { .. } | HoldStatus::Released { .. } => {
        return Ok(None);
      }
      HoldStatus::Confirmed { .. } => {
        return Err(Error::HoldNotActive {
          hold_id,
          status: hold.status.kind(),
        });
      }
    }
    let labels: Vec<SeatLabel> = hold.seats.iter().cloned().collect();
    Ok(self.release_seats(&labels, now)?.into_iter().next())
  }

  /// Return reserved seats to available. Already-available seats are
  /// skipped; booked or disabled seats fail the whole call.
  ///
  /// A hold that loses its last seat this way becomes `Released`.
  pub fn release_seats(
    &mut self,
    labels: &[SeatLabel],
    now: DateTime<Utc>,
  ) -> Result<Vec<Transition>> {
    let set = self.requested_set(labels)?;
    let conflicts = self.conflicts(&set, &[
      SeatStateKind::Available,
      SeatStateKind::Reserved,
    ]);
    if !conflicts.is_empty() {
      return Err(Error::SeatConflict(conflicts));
    }

    let mut by_hold: BTreeMap<HoldId, Vec<SeatLabel>> = BTreeMap::new();
    for label in &set {
      if let Some(SeatState::Reserved { hold_id, .. }) =
        self.seats.get(label).map(|s| &s.state)
      {
        by_hold.entry(*hold_id).or_default().push(label.clone());
      }
    }

    let mut transitions = Vec::with_capacity(by_hold.len());
    for (hold_id, freed) in by_hold {
      for label in &freed {
        self.set_state(label, SeatState::Available);
      }
      if let Some(hold) = self.holds.get_mut(&hold_id) {
        for label in &freed {
          hold.seats.remove(label);
        }
        if hold.seats.is_empty() && hold.status.is_active() {
          hold.status = HoldStatus::Released { at: now };
        }
      }
      transitions.push(Transition::new(
        AuditAction::Released,
        Some(hold_id),
        freed,
      ));
    }
    Ok(transitions)
  }

  // ── Bookings ──────────────────────────────────────────────────────────────

  /// Return booked seats to available. Every seat must currently be booked.
  pub fn cancel_booking(
    &mut self,
    labels: &[SeatLabel],
  ) -> Result<Vec<Transition>> {
    let set = self.requested_set(labels)?;
    let conflicts = self.conflicts(&set, &[SeatStateKind::Booked]);
    if !conflicts.is_empty() {
      return Err(Error::SeatConflict(conflicts));
    }

    let mut by_hold: BTreeMap<HoldId, Vec<SeatLabel>> = BTreeMap::new();
    for label in &set {
      if let Some(SeatState::Booked { hold_id }) =
        self.seats.get(label).map(|s| &s.state)
      {
        by_hold.entry(*hold_id).or_default().push(label.clone());
      }
    }

    let mut transitions = Vec::with_capacity(by_hold.len());
    for (hold_id, freed) in by_hold {
      for label in &freed {
        self.set_state(label, SeatState::Available);
      }
      transitions.push(Transition::new(
        AuditAction::Cancelled,
        Some(hold_id),
        freed,
      ));
    }
    Ok(transitions)
  }

  /// Record that the booking ledger acknowledged a confirmation.
  pub fn mark_ledger_recorded(&mut self, hold_id: HoldId) -> bool {
    match self.holds.get_mut(&hold_id).map(|h| &mut h.status) {
      Some(HoldStatus::Confirmed { ledger_recorded, .. })
        if !*ledger_recorded =>
      {
        *ledger_recorded = true;
        true
      }
      _ => false,
    }
  }

  // ── Administration ────────────────────────────────────────────────────────

  /// Take seats out of service. Already-disabled seats are skipped.
  pub fn disable_seats(
    &mut self,
    labels: &[SeatLabel],
  ) -> Result<Option<Transition>> {
    self.toggle_unavailable(labels, true)
  }

  /// Put disabled seats back into service. Already-available seats are
  /// skipped.
  pub fn enable_seats(
    &mut self,
    labels: &[SeatLabel],
  ) -> Result<Option<Transition>> {
    self.toggle_unavailable(labels, false)
  }

  fn toggle_unavailable(
    &mut self,
    labels: &[SeatLabel],
    disable: bool,
  ) -> Result<Option<Transition>> {
    let set = self.requested_set(labels)?;
    let conflicts = self.conflicts(&set, &[
      SeatStateKind::Available,
      SeatStateKind::Unavailable,
    ]);
    if !conflicts.is_empty() {
      return Err(Error::SeatConflict(conflicts));
    }

    let (from, to, action) = if disable {
      (SeatState::Available, SeatState::Unavailable, AuditAction::Disabled)
    } else {
      (SeatState::Unavailable, SeatState::Available, AuditAction::Enabled)
    };

    let changed: Vec<SeatLabel> = set
      .into_iter()
      .filter(|label| self.seats.get(label).map(|s| &s.state) == Some(&from))
      .collect();
    if changed.is_empty() {
      return Ok(None);
    }
    for label in &changed {
      self.set_state(label, to.clone());
    }
    Ok(Some(Transition::new(action, None, changed)))
  }

  /// Stop accepting holds and confirmations. Idempotent.
  pub fn deactivate(&mut self) -> Option<Transition> {
    if !self.active {
      return None;
    }
    self.active = false;
    Some(Transition::new(AuditAction::Deactivated, None, []))
  }

  /// Drop terminal holds closed before `cutoff`. Confirmations still waiting
  /// on the ledger are kept.
  pub fn prune_holds(&mut self, cutoff: DateTime<Utc>) -> usize {
    let before = self.holds.len();
    self.holds.retain(|_, hold| match &hold.status {
      HoldStatus::Active => true,
      HoldStatus::Confirmed { ledger_recorded: false, .. } => true,
      status => status.closed_at().is_none_or(|at| at >= cutoff),
    });
    before - self.holds.len()
  }

  // ── Invariants ────────────────────────────────────────────────────────────

  /// Verify the accounting identity and seat/hold cross-references.
  pub fn check_invariants(&self) -> std::result::Result<(), String> {
    let a = self.availability();
    if a.available + a.reserved + a.booked + a.unavailable != a.total {
      return Err(format!("accounting identity broken: {a:?}"));
    }

    for (label, seat) in &self.seats {
      if let SeatState::Reserved { hold_id, expires_at } = &seat.state {
        let hold = self
          .holds
          .get(hold_id)
          .ok_or_else(|| format!("{label} reserved by missing hold {hold_id}"))?;
        if !hold.status.is_active() {
          return Err(format!("{label} reserved by inactive hold {hold_id}"));
        }
        if !hold.seats.contains(label) || hold.expires_at != *expires_at {
          return Err(format!("{label} disagrees with hold {hold_id}"));
        }
      }
    }

    for hold in self.active_holds() {
      for label in &hold.seats {
        let reserved_here = matches!(
          self.seats.get(label).map(|s| &s.state),
          Some(SeatState::Reserved { hold_id, .. }) if *hold_id == hold.hold_id
        );
        if !reserved_here {
          return Err(format!(
            "active hold {} lists {label} but does not reserve it",
            hold.hold_id
          ));
        }
      }
    }
    Ok(())
  }
}
