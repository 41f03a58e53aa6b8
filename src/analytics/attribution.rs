use std::collections::{BTreeSet, HashMap};

use crate::board::{AppMapping, Card, TsGroup};

/// Label prefix that marks an app label
pub const APP_LABEL_PREFIX: &str = "App:";

/// App names carried by a card's `App:` labels, prefix stripped, in label order
pub fn app_labels(card: &Card) -> impl Iterator<Item = &str> {
  card
    .labels
    .iter()
    .filter_map(|label| label.name.strip_prefix(APP_LABEL_PREFIX))
    .map(str::trim)
}

/// Lookup from app label to its team mappings.
///
/// A label may map to several rows and a card may carry several app labels,
/// so one card can count toward more than one team.
#[derive(Debug, Clone, Default)]
pub struct AppDirectory {
  by_label: HashMap<String, Vec<AppMapping>>,
}

impl AppDirectory {
  pub fn new(mappings: &[AppMapping]) -> Self {
    let mut by_label: HashMap<String, Vec<AppMapping>> = HashMap::new();
    for mapping in mappings {
      by_label
        .entry(mapping.label_name.clone())
        .or_default()
        .push(mapping.clone());
    }
    Self { by_label }
  }

  /// Every mapping row matched by any of the card's app labels
  fn mappings_for<'a>(&'a self, card: &'a Card) -> impl Iterator<Item = &'a AppMapping> + 'a {
    app_labels(card)
      .filter_map(|label| self.by_label.get(label))
      .flatten()
  }

  pub fn teams_of(&self, card: &Card) -> BTreeSet<String> {
    self
      .mappings_for(card)
      .map(|m| m.product_team.clone())
      .collect()
  }

  pub fn ts_groups_of(&self, card: &Card) -> BTreeSet<TsGroup> {
    self.mappings_for(card).map(|m| m.ts_group).collect()
  }

  pub fn apps_of(&self, card: &Card) -> BTreeSet<String> {
    self.mappings_for(card).map(|m| m.app_name.clone()).collect()
  }

  pub fn belongs_to(&self, card: &Card, group: TsGroup) -> bool {
    self.mappings_for(card).any(|m| m.ts_group == group)
  }

  /// All product teams named in the table
  pub fn teams(&self) -> BTreeSet<String> {
    self
      .by_label
      .values()
      .flatten()
      .map(|m| m.product_team.clone())
      .collect()
  }
}
