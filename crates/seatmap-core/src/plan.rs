//! Seat plans: the catalog's description of an event's seats and pricing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ids::SeatLabel};

/// Largest price a category or a whole booking may carry. Prices are
/// stored in signed 64-bit columns.
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// One seat as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSeat {
  pub label:    SeatLabel,
  pub category: String,
}

/// Seat labels with their categories plus a price per category (minor
/// currency units). Read once, when an inventory is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPlan {
  pub seats:   Vec<PlannedSeat>,
  pub pricing: BTreeMap<String, u64>,
}

impl SeatPlan {
  /// A rectangular plan: rows named by `rows`, numbered `1..=per_row`, all
  /// in one category.
  pub fn grid<I, S>(
    rows: I,
    per_row: u32,
    category: &str,
    price: u64,
  ) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut seats = Vec::new();
    for row in rows {
      for n in 1..=per_row {
        seats.push(PlannedSeat {
          label:    SeatLabel::new(format!("{}{n}", row.as_ref()))?,
          category: category.to_owned(),
        });
      }
    }
    let plan = Self {
      seats,
      pricing: BTreeMap::from([(category.to_owned(), price)]),
    };
    plan.validate()?;
    Ok(plan)
  }

  /// Add a category with its price, replacing any previous price.
  pub fn with_category(mut self, category: &str, price: u64) -> Self {
    self.pricing.insert(category.to_owned(), price);
    self
  }

  /// Reassign the listed seats to `category`.
  pub fn assign(mut self, labels: &[SeatLabel], category: &str) -> Self {
    for seat in &mut self.seats {
      if labels.contains(&seat.label) {
        seat.category = category.to_owned();
      }
    }
    self
  }

  /// A plan must list at least one seat, no label twice, and price every
  /// category it uses.
  pub fn validate(&self) -> Result<()> {
    if self.seats.is_empty() {
      return Err(Error::InvalidPlan("plan has no seats".into()));
    }

    if let Some((category, price)) =
      self.pricing.iter().find(|(_, price)| **price > MAX_PRICE)
    {
      return Err(Error::InvalidPlan(format!(
        "category {category:?} price {price} exceeds {MAX_PRICE}"
      )));
    }

    let mut seen = BTreeSet::new();
    for seat in &self.seats {
      if !seen.insert(&seat.label) {
        return Err(Error::InvalidPlan(format!(
          "seat {} listed more than once",
          seat.label
        )));
      }
      if !self.pricing.contains_key(&seat.category) {
        return Err(Error::InvalidPlan(format!(
          "seat {} uses unpriced category {:?}",
          seat.label, seat.category
        )));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grid_labels_rows_then_numbers() {
    let plan = SeatPlan::grid(["A", "B"], 2, "standard", 1200).unwrap();
    let labels: Vec<_> =
      plan.seats.iter().map(|s| s.label.as_str().to_owned()).collect();
    assert_eq!(labels, ["A1", "A2", "B1", "B2"]);
    assert_eq!(plan.pricing["standard"], 1200);
  }

  #[test]
  fn duplicate_labels_rejected() {
    let mut plan = SeatPlan::grid(["A"], 2, "standard", 1200).unwrap();
    plan.seats.push(plan.seats[0].clone());
    assert!(matches!(plan.validate(), Err(Error::InvalidPlan(_))));
  }

  #[test]
  fn unpriced_category_rejected() {
    let a1 = SeatLabel::new("A1").unwrap();
    let plan = SeatPlan::grid(["A"], 2, "standard", 1200)
      .unwrap()
      .assign(&[a1], "vip");
    assert!(matches!(plan.validate(), Err(Error::InvalidPlan(_))));

    let plan = plan.with_category("vip", 2500);
    assert!(plan.validate().is_ok());
  }

  #[test]
  fn price_above_storage_range_rejected() {
    assert!(matches!(
      SeatPlan::grid(["A"], 1, "standard", MAX_PRICE + 1),
      Err(Error::InvalidPlan(_))
    ));
    assert!(SeatPlan::grid(["A"], 1, "standard", MAX_PRICE).is_ok());
  }

  #[test]
  fn empty_plan_rejected() {
    assert!(SeatPlan::default().validate().is_err());
  }
}
