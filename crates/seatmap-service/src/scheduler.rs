//! Hold-expiry timers.
//!
//! A timer is an explicit task keyed by hold id. When it fires it does not
//! touch any state itself; it sends an [`ExpiryTask`] naming the event and
//! hold, and the service decides what (if anything) to do under the event's
//! write lock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use seatmap_core::{
  clock::Clock,
  ids::{EventId, HoldId},
};
use tokio::{sync::mpsc, task::AbortHandle};

/// A request to consider expiring one hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryTask {
  pub event_id: EventId,
  pub hold_id:  HoldId,
  pub due:      DateTime<Utc>,
}

/// Schedules and cancels expiry tasks. The hold id is the cancellation
/// token; scheduling a hold twice replaces the earlier timer.
pub trait Scheduler: Send + Sync {
  fn schedule_at(&self, task: ExpiryTask);

  /// Cancel a pending timer. Unknown or already-fired holds are ignored.
  fn cancel(&self, hold_id: HoldId);

  /// Number of timers that have not been cancelled. A fired timer counts
  /// until the service cancels it.
  fn pending(&self) -> usize;
}

/// Timers backed by `tokio::time::sleep`, delivering due tasks on a channel.
pub struct TokioScheduler {
  clock:  Arc<dyn Clock>,
  timers: DashMap<HoldId, AbortHandle>,
  tx:     mpsc::UnboundedSender<ExpiryTask>,
}

impl TokioScheduler {
  /// Build a scheduler and the receiving end its timers deliver to.
  pub fn new(
    clock: Arc<dyn Clock>,
  ) -> (Self, mpsc::UnboundedReceiver<ExpiryTask>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { clock, timers: DashMap::new(), tx }, rx)
  }
}

impl Scheduler for TokioScheduler {
  fn schedule_at(&self, task: ExpiryTask) {
    let delay = (task.due - self.clock.now()).to_std().unwrap_or_default();
    let tx = self.tx.clone();

    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      // The receiver only goes away when the service is dropped.
      let _ = tx.send(task);
    });

    if let Some(previous) =
      self.timers.insert(task.hold_id, handle.abort_handle())
    {
      previous.abort();
    }
    tracing::trace!(
      event_id = %task.event_id,
      hold_id = %task.hold_id,
      ?delay,
      "expiry scheduled"
    );
  }

  fn cancel(&self, hold_id: HoldId) {
    if let Some((_, handle)) = self.timers.remove(&hold_id) {
      handle.abort();
      tracing::trace!(%hold_id, "expiry cancelled");
    }
  }

  fn pending(&self) -> usize { self.timers.len() }
}

impl Drop for TokioScheduler {
  fn drop(&mut self) {
    for entry in self.timers.iter() {
      entry.value().abort();
    }
  }
}
