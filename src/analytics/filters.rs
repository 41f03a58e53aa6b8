//! Cascading filter pipeline.
//!
//! Stages run in a fixed order and each one narrows the output of the
//! previous stage. A stage whose selector is unset passes its input through.
//! The team-scoped hour stages sit after the app stage, so they only ever
//! see cards that already passed it; callers must re-run the whole chain
//! from the full card set whenever any selector changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

use super::attribution::app_labels;
use super::completion::{created_timestamp_of, EventKind};
use super::shift::{local_hour, shift_of, CoarseShift};
use super::ReferenceData;
use crate::board::{ActionKind, Card, TsGroup};

/// Current selector state, one optional value per stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selectors {
  /// Support member id that must be on the card
  pub member_id: Option<String>,
  /// Status list id
  pub list_id: Option<String>,
  /// Shift of the card's creation
  pub shift: Option<CoarseShift>,
  /// Full name of the member who performed a removal on the card
  pub removed_by: Option<String>,
  /// App label with the `App:` prefix stripped
  pub app: Option<String>,
  pub completed_hour: Option<u32>,
  pub created_hour: Option<u32>,
  pub ts1_completed_hour: Option<u32>,
  pub ts1_created_hour: Option<u32>,
  pub ts2_completed_hour: Option<u32>,
  pub ts2_created_hour: Option<u32>,
}

impl Selectors {
  /// No stage set, every card passes
  pub fn is_empty(&self) -> bool {
    FilterStage::ALL.iter().all(|stage| !stage.is_active(self))
  }
}

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStage {
  Member,
  Status,
  Shift,
  RemovedBy,
  App,
  CompletedHour,
  CreatedHour,
  Ts1CompletedHour,
  Ts1CreatedHour,
  Ts2CompletedHour,
  Ts2CreatedHour,
}

/// A value a stage can be set to, for populating selector menus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
  pub value: String,
  pub label: String,
}

impl FilterOption {
  fn same(value: impl Into<String>) -> Self {
    let value = value.into();
    Self {
      label: value.clone(),
      value,
    }
  }
}

impl FilterStage {
  /// Pipeline order
  pub const ALL: [FilterStage; 11] = [
    FilterStage::Member,
    FilterStage::Status,
    FilterStage::Shift,
    FilterStage::RemovedBy,
    FilterStage::App,
    FilterStage::CompletedHour,
    FilterStage::CreatedHour,
    FilterStage::Ts1CompletedHour,
    FilterStage::Ts1CreatedHour,
    FilterStage::Ts2CompletedHour,
    FilterStage::Ts2CreatedHour,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      FilterStage::Member => "Member",
      FilterStage::Status => "Status",
      FilterStage::Shift => "Shift",
      FilterStage::RemovedBy => "Removed by",
      FilterStage::App => "App",
      FilterStage::CompletedHour => "Completed hour",
      FilterStage::CreatedHour => "Created hour",
      FilterStage::Ts1CompletedHour => "TS1 completed hour",
      FilterStage::Ts1CreatedHour => "TS1 created hour",
      FilterStage::Ts2CompletedHour => "TS2 completed hour",
      FilterStage::Ts2CreatedHour => "TS2 created hour",
    }
  }

  /// Event and team scope of the hour stages
  fn hour_scope(&self) -> Option<(EventKind, Option<TsGroup>)> {
    match self {
      FilterStage::CompletedHour => Some((EventKind::Completed, None)),
      FilterStage::CreatedHour => Some((EventKind::Created, None)),
      FilterStage::Ts1CompletedHour => Some((EventKind::Completed, Some(TsGroup::Ts1))),
      FilterStage::Ts1CreatedHour => Some((EventKind::Created, Some(TsGroup::Ts1))),
      FilterStage::Ts2CompletedHour => Some((EventKind::Completed, Some(TsGroup::Ts2))),
      FilterStage::Ts2CreatedHour => Some((EventKind::Created, Some(TsGroup::Ts2))),
      _ => None,
    }
  }

  fn hour_selector(&self, selectors: &Selectors) -> Option<u32> {
    match self {
      FilterStage::CompletedHour => selectors.completed_hour,
      FilterStage::CreatedHour => selectors.created_hour,
      FilterStage::Ts1CompletedHour => selectors.ts1_completed_hour,
      FilterStage::Ts1CreatedHour => selectors.ts1_created_hour,
      FilterStage::Ts2CompletedHour => selectors.ts2_completed_hour,
      FilterStage::Ts2CreatedHour => selectors.ts2_created_hour,
      _ => None,
    }
  }

  /// Whether this stage's selector is set
  pub fn is_active(&self, selectors: &Selectors) -> bool {
    match self {
      FilterStage::Member => selectors.member_id.is_some(),
      FilterStage::Status => selectors.list_id.is_some(),
      FilterStage::Shift => selectors.shift.is_some(),
      FilterStage::RemovedBy => selectors.removed_by.is_some(),
      FilterStage::App => selectors.app.is_some(),
      _ => self.hour_selector(selectors).is_some(),
    }
  }

  /// Whether a card passes this stage. Unset stages pass everything.
  pub fn matches(&self, card: &Card, selectors: &Selectors, refs: &ReferenceData) -> bool {
    match self {
      FilterStage::Member => match &selectors.member_id {
        Some(id) => card.member_ids.contains(id),
        None => true,
      },
      FilterStage::Status => match &selectors.list_id {
        Some(id) => card.list_id == *id,
        None => true,
      },
      FilterStage::Shift => match selectors.shift {
        Some(selected) => shift_of(created_timestamp_of(card).as_ref(), &refs.offset)
          .map(|shift| selected.contains(shift))
          .unwrap_or(false),
        None => true,
      },
      FilterStage::RemovedBy => match &selectors.removed_by {
        Some(name) => removed_by(card, name),
        None => true,
      },
      FilterStage::App => match &selectors.app {
        Some(app) => app_labels(card).any(|label| label == app.as_str()),
        None => true,
      },
      _ => {
        let (Some(hour), Some((kind, team))) = (self.hour_selector(selectors), self.hour_scope())
        else {
          return true;
        };
        if let Some(group) = team {
          if !refs.apps.belongs_to(card, group) {
            return false;
          }
        }
        kind
          .timestamp_of(card)
          .map(|ts| local_hour(&ts, &refs.offset) == hour)
          .unwrap_or(false)
      }
    }
  }

  /// Narrow `cards` by this stage
  pub fn apply<'a>(
    &self,
    cards: Vec<&'a Card>,
    selectors: &Selectors,
    refs: &ReferenceData,
  ) -> Vec<&'a Card> {
    if !self.is_active(selectors) {
      return cards;
    }
    cards
      .into_iter()
      .filter(|card| self.matches(card, selectors, refs))
      .collect()
  }

  /// Distinct values this stage could be set to over a card set
  pub fn options(&self, cards: &[Card], refs: &ReferenceData) -> Vec<FilterOption> {
    match self {
      FilterStage::Member => refs
        .members
        .iter()
        .filter(|m| m.role.is_support())
        .map(|m| FilterOption {
          value: m.id.clone(),
          label: m.full_name.clone(),
        })
        .collect(),
      FilterStage::Status => {
        let ids: BTreeSet<&str> = cards.iter().map(|c| c.list_id.as_str()).collect();
        ids
          .into_iter()
          .map(|id| FilterOption {
            value: id.to_string(),
            label: refs.list_name(id).to_string(),
          })
          .collect()
      }
      FilterStage::Shift => CoarseShift::ALL
        .iter()
        .map(|s| FilterOption::same(s.label()))
        .collect(),
      FilterStage::RemovedBy => {
        let names: BTreeSet<&str> = cards
          .iter()
          .flat_map(|c| c.actions.iter())
          .filter(|a| matches!(a.kind, ActionKind::MemberRemove { .. }))
          .map(|a| a.actor.full_name.as_str())
          .filter(|name| !name.is_empty())
          .collect();
        names.into_iter().map(FilterOption::same).collect()
      }
      FilterStage::App => {
        let apps: BTreeSet<&str> = cards.iter().flat_map(|c| app_labels(c)).collect();
        apps.into_iter().map(FilterOption::same).collect()
      }
      _ => {
        let Some((kind, team)) = self.hour_scope() else {
          return Vec::new();
        };
        let hours: BTreeSet<u32> = cards
          .iter()
          .filter(|card| team.map_or(true, |group| refs.apps.belongs_to(card, group)))
          .filter_map(|card| kind.timestamp_of(card))
          .map(|ts| local_hour(&ts, &refs.offset))
          .collect();
        hours
          .into_iter()
          .map(|h| FilterOption {
            value: h.to_string(),
            label: format!("{:02}:00", h),
          })
          .collect()
      }
    }
  }
}

/// Some member removal on the card was performed by `name`.
///
/// Compares the acting member's display name, not the removed member, so a
/// lead removing someone else also matches.
fn removed_by(card: &Card, name: &str) -> bool {
  card
    .actions
    .iter()
    .any(|a| matches!(a.kind, ActionKind::MemberRemove { .. }) && a.actor.full_name == name)
}

/// Run every stage in order, each on the previous stage's output
pub fn apply_filters<'a>(
  cards: &'a [Card],
  selectors: &Selectors,
  refs: &ReferenceData,
) -> Vec<&'a Card> {
  FilterStage::ALL
    .iter()
    .fold(cards.iter().collect(), |remaining, stage| {
      let narrowed = stage.apply(remaining, selectors, refs);
      trace!(stage = stage.label(), remaining = narrowed.len(), "Filter stage");
      narrowed
    })
}
