use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::timeline::normalize;
use crate::board::Card;

/// Which card event a heatmap or hour filter is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  Created,
  Completed,
}

impl EventKind {
  pub fn timestamp_of(&self, card: &Card) -> Option<DateTime<Utc>> {
    match self {
      EventKind::Created => created_timestamp_of(card),
      EventKind::Completed => completion_timestamp_of(card),
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      EventKind::Created => "created",
      EventKind::Completed => "completed",
    }
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for EventKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "created" => Ok(EventKind::Created),
      "completed" => Ok(EventKind::Completed),
      other => Err(format!("unknown event '{}', expected created or completed", other)),
    }
  }
}

/// When the card was marked done, for completion heatmaps.
///
/// Cards not flagged due-complete never have a completion time. Otherwise the
/// latest strict false -> true transition wins, then the latest update that
/// merely reports the card complete, then `completed_at`, then `due_at`.
/// Undated actions are skipped.
pub fn completion_timestamp_of(card: &Card) -> Option<DateTime<Utc>> {
  if !card.is_due_complete {
    return None;
  }

  let timeline = normalize(&card.actions);
  let updates: Vec<_> = timeline
    .iter()
    .rev()
    .filter(|a| a.is_card_update() && a.date.is_some())
    .filter_map(|a| a.due_complete.map(|t| (t, a.date)))
    .collect();

  let strict = updates
    .iter()
    .find(|(t, _)| t.is_completion())
    .and_then(|(_, date)| *date);

  strict
    .or_else(|| {
      updates
        .iter()
        .find(|(t, _)| t.is_complete)
        .and_then(|(_, date)| *date)
    })
    .or(card.completed_at)
    .or(card.due_at)
}

/// Date of the earliest dated creation action
pub fn created_timestamp_of(card: &Card) -> Option<DateTime<Utc>> {
  card
    .actions
    .iter()
    .filter(|a| a.is_create())
    .filter_map(|a| a.date)
    .min()
}
