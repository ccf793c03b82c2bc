//! Runtime configuration, deserialised from `seatmap.toml` and `SEATMAP_*`
//! environment variables.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use chrono::Duration;
use serde::Deserialize;
use seatmap_core::{ids::EventId, ids::SeatLabel, plan::SeatPlan};

// ─── Service configuration ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
  pub store_path:          PathBuf,
  /// Hold length when the caller does not give one.
  pub default_hold_secs:   u64,
  pub max_hold_secs:       u64,
  /// How long terminal holds are kept in the record before pruning.
  pub hold_retention_secs: u64,
  /// Attempts per mutation before giving up on version conflicts.
  pub max_save_attempts:   u32,
  /// Interval of the backstop sweep in `seatmap run`.
  pub sweep_interval_secs: u64,
  /// Seat plans served by the built-in catalog.
  pub events:              Vec<EventConfig>,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      store_path:          PathBuf::from("seatmap.db"),
      default_hold_secs:   900,
      max_hold_secs:       3600,
      hold_retention_secs: 86_400,
      max_save_attempts:   3,
      sweep_interval_secs: 30,
      events:              Vec::new(),
    }
  }
}

impl ServiceConfig {
  /// Layer an optional TOML file under `SEATMAP_`-prefixed environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SEATMAP"))
      .build()?
      .try_deserialize()
  }

  pub fn hold_retention(&self) -> Duration { seconds(self.hold_retention_secs) }

  /// `store_path` with a leading `~` expanded to the home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Whole seconds as a [`Duration`], saturating at the largest representable
/// span.
pub(crate) fn seconds(secs: u64) -> Duration {
  i64::try_from(secs)
    .ok()
    .and_then(Duration::try_seconds)
    .unwrap_or(Duration::MAX)
}

// ─── Catalog entries ──────────────────────────────────────────────────────────

/// One event's seat plan as written in the config file: a grid of rows in a
/// base category, with optional named categories carved out of it.
#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
  pub event_id:      EventId,
  #[serde(default)]
  pub name:          Option<String>,
  pub rows:          Vec<String>,
  pub seats_per_row: u32,
  #[serde(default = "default_category")]
  pub category:      String,
  pub price:         u64,
  #[serde(default)]
  pub categories:    BTreeMap<String, CategoryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
  pub price: u64,
  pub seats: Vec<String>,
}

fn default_category() -> String { "standard".to_owned() }

impl EventConfig {
  pub fn to_plan(&self) -> seatmap_core::Result<SeatPlan> {
    let mut plan = SeatPlan::grid(
      &self.rows,
      self.seats_per_row,
      &self.category,
      self.price,
    )?;
    for (name, category) in &self.categories {
      let labels = category
        .seats
        .iter()
        .map(SeatLabel::new)
        .collect::<seatmap_core::Result<Vec<_>>>()?;
      plan = plan.with_category(name, category.price).assign(&labels, name);
    }
    plan.validate()?;
    Ok(plan)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_config_builds_categorised_plan() {
    let event_id = EventId::new();
    let toml = format!(
      r#"
      event_id = "{event_id}"
      rows = ["A", "B"]
      seats_per_row = 4
      price = 1200

      [categories.vip]
      price = 2000
      seats = ["A2", "A3"]
      "#
    );
    let cfg: EventConfig = config::Config::builder()
      .add_source(config::File::from_str(&toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    let plan = cfg.to_plan().unwrap();
    assert_eq!(plan.seats.len(), 8);
    assert_eq!(plan.pricing["vip"], 2000);
    let a2 = plan.seats.iter().find(|s| s.label.as_str() == "A2").unwrap();
    assert_eq!(a2.category, "vip");
  }

  #[test]
  fn vip_seat_outside_grid_still_validates_plan() {
    let cfg = EventConfig {
      event_id:      EventId::new(),
      name:          None,
      rows:          vec!["A".into()],
      seats_per_row: 2,
      category:      default_category(),
      price:         900,
      categories:    BTreeMap::from([("vip".to_owned(), CategoryConfig {
        price: 1500,
        seats: vec!["Z9".into()],
      })]),
    };
    // Unknown labels are simply not reassigned.
    let plan = cfg.to_plan().unwrap();
    assert!(plan.seats.iter().all(|s| s.category == "standard"));
  }

  #[test]
  fn defaults_are_sane() {
    let cfg = ServiceConfig::default();
    assert!(cfg.default_hold_secs <= cfg.max_hold_secs);
    assert_eq!(cfg.hold_retention(), Duration::days(1));
    assert_eq!(cfg.default_hold_secs, 15 * 60);
  }

  #[test]
  fn oversized_seconds_saturate() {
    assert_eq!(seconds(u64::MAX), Duration::MAX);
  }

  #[test]
  fn tilde_expands_to_home() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/seats.db")),
        PathBuf::from(home).join("seats.db")
      );
    }
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
