//! An in-memory [`EventCatalog`] populated from configuration.

use std::{collections::HashMap, convert::Infallible};

use seatmap_core::{ids::EventId, plan::SeatPlan, store::EventCatalog};

use crate::config::EventConfig;

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
  plans: HashMap<EventId, SeatPlan>,
}

impl StaticCatalog {
  pub fn new() -> Self { Self::default() }

  pub fn with_plan(mut self, event_id: EventId, plan: SeatPlan) -> Self {
    self.plans.insert(event_id, plan);
    self
  }

  /// Build every configured plan. The first invalid plan aborts the load.
  pub fn from_config(events: &[EventConfig]) -> seatmap_core::Result<Self> {
    let plans = events
      .iter()
      .map(|event| Ok((event.event_id, event.to_plan()?)))
      .collect::<seatmap_core::Result<_>>()?;
    Ok(Self { plans })
  }

  pub fn len(&self) -> usize { self.plans.len() }

  pub fn is_empty(&self) -> bool { self.plans.is_empty() }
}

impl EventCatalog for StaticCatalog {
  type Error = Infallible;

  async fn seat_plan(&self, event_id: EventId) -> Result<Option<SeatPlan>, Infallible> {
    Ok(self.plans.get(&event_id).cloned())
  }
}
