//! Identifier newtypes.
//!
//! Event and hold identifiers are UUIDs. Seat labels are opaque strings that
//! only mean something within one event; there is no global seat identity.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Identifier of one bookable showtime/screening.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for EventId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for EventId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl FromStr for EventId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Uuid::parse_str(s).map(Self)
  }
}

/// Identifier of one hold batch.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HoldId(pub Uuid);

impl HoldId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for HoldId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for HoldId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl FromStr for HoldId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Uuid::parse_str(s).map(Self)
  }
}

/// A seat label such as `"A1"`. Unique within an event.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SeatLabel(String);

impl SeatLabel {
  /// Build a label, trimming surrounding whitespace. Empty labels are
  /// rejected.
  pub fn new(label: impl Into<String>) -> Result<Self> {
    let label = label.into();
    let trimmed = label.trim();
    if trimmed.is_empty() {
      return Err(Error::InvalidRequest("seat label must not be empty".into()));
    }
    if trimmed.len() == label.len() {
      Ok(Self(label))
    } else {
      Ok(Self(trimmed.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SeatLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for SeatLabel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for SeatLabel {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<SeatLabel> for String {
  fn from(label: SeatLabel) -> Self { label.0 }
}

/// Parse a list of raw strings into labels, failing on the first empty one.
pub fn parse_labels<I, S>(raw: I) -> Result<Vec<SeatLabel>>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  raw.into_iter().map(SeatLabel::new).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_is_trimmed() {
    let label = SeatLabel::new("  B12 ").unwrap();
    assert_eq!(label.as_str(), "B12");
  }

  #[test]
  fn empty_label_rejected() {
    assert!(matches!(SeatLabel::new("   "), Err(Error::InvalidRequest(_))));
  }

  #[test]
  fn label_deserialize_validates() {
    let ok: SeatLabel = serde_json::from_str("\"C3\"").unwrap();
    assert_eq!(ok.as_str(), "C3");
    assert!(serde_json::from_str::<SeatLabel>("\"\"").is_err());
  }

  #[test]
  fn event_id_parses_from_display() {
    let id = EventId::new();
    let parsed: EventId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
  }
}
