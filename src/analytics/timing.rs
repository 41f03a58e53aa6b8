//! Resolution-time metrics derived from landmark events in a card's timeline.
//!
//! Three landmarks are located in the normalized timeline:
//! - the first action (whatever sorts first, not necessarily the creation)
//! - the first move out of the "New Issues" list
//! - the first comment containing "done issue"
//!
//! A card without both of the last two is still in progress and has no
//! timing. That is the common case, not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::timeline::normalize;
use crate::board::{Action, ActionKind, Card};

/// List a card leaves when support first picks it up (compared lowercase)
pub const NEW_ISSUES_LIST: &str = "new issues";

/// Comment marker that closes a ticket (compared lowercase, substring)
pub const DONE_MARKER: &str = "done issue";

/// Durations in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionTiming {
  /// First action -> done comment
  pub resolution_time_minutes: i64,
  /// Leaving "New Issues" -> done comment
  pub ts_resolution_time_minutes: i64,
  /// First action -> leaving "New Issues"
  pub first_action_time_minutes: i64,
}

fn is_new_issues_exit(action: &Action) -> bool {
  match &action.kind {
    ActionKind::ListMove {
      before: Some(before),
      ..
    } => before.name.to_lowercase() == NEW_ISSUES_LIST,
    _ => false,
  }
}

fn is_done_comment(action: &Action) -> bool {
  match &action.kind {
    ActionKind::Comment { text } => text.to_lowercase().contains(DONE_MARKER),
    _ => false,
  }
}

/// Minutes since the epoch, floored
fn whole_minutes(ts: &DateTime<Utc>) -> i64 {
  ts.timestamp().div_euclid(60)
}

/// Derive the three timing metrics from a card's actions.
///
/// Returns `None` when the actions are empty, a landmark is missing, or a
/// landmark has no date. Each endpoint is floored to its minute before
/// subtracting, so `ts_resolution + first_action == resolution` always holds.
pub fn compute_timing(actions: &[Action]) -> Option<ResolutionTiming> {
  if actions.is_empty() {
    return None;
  }

  let timeline = normalize(actions);

  let first_event = timeline.first()?;
  let exit_new_issues = timeline.iter().find(|a| is_new_issues_exit(a))?;
  let done_event = timeline.iter().find(|a| is_done_comment(a))?;

  let first = whole_minutes(first_event.date.as_ref()?);
  let exit = whole_minutes(exit_new_issues.date.as_ref()?);
  let done = whole_minutes(done_event.date.as_ref()?);

  Some(ResolutionTiming {
    resolution_time_minutes: done - first,
    ts_resolution_time_minutes: done - exit,
    first_action_time_minutes: exit - first,
  })
}

/// Timing for every card, in input order
pub fn timings_for(cards: &[&Card]) -> Vec<(String, Option<ResolutionTiming>)> {
  cards
    .iter()
    .map(|card| (card.id.clone(), compute_timing(&card.actions)))
    .collect()
}

/// Mean and median of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
  pub mean: f64,
  pub median: f64,
}

impl MetricStats {
  fn from_values(mut values: Vec<i64>) -> Option<Self> {
    if values.is_empty() {
      return None;
    }
    values.sort_unstable();

    let len = values.len();
    let mean = values.iter().sum::<i64>() as f64 / len as f64;
    let median = if len % 2 == 0 {
      (values[len / 2 - 1] + values[len / 2]) as f64 / 2.0
    } else {
      values[len / 2] as f64
    };

    Some(Self { mean, median })
  }
}

/// Aggregate over the cards that have a timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingSummary {
  pub total_cards: usize,
  pub resolved_cards: usize,
  pub resolution: Option<MetricStats>,
  pub ts_resolution: Option<MetricStats>,
  pub first_action: Option<MetricStats>,
}

impl TimingSummary {
  pub fn from_timings(timings: &[(String, Option<ResolutionTiming>)]) -> Self {
    let resolved: Vec<&ResolutionTiming> = timings.iter().filter_map(|(_, t)| t.as_ref()).collect();

    Self {
      total_cards: timings.len(),
      resolved_cards: resolved.len(),
      resolution: MetricStats::from_values(
        resolved.iter().map(|t| t.resolution_time_minutes).collect(),
      ),
      ts_resolution: MetricStats::from_values(
        resolved
          .iter()
          .map(|t| t.ts_resolution_time_minutes)
          .collect(),
      ),
      first_action: MetricStats::from_values(
        resolved
          .iter()
          .map(|t| t.first_action_time_minutes)
          .collect(),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analytics::testing::{
    at, at_secs, comment, create, list_move, undated_comment, CardBuilder,
  };
  use proptest::prelude::*;

  fn scenario_one() -> Vec<Action> {
    vec![
      create(at(8, 0)),
      list_move("New Issues", "Doing", at(9, 30)),
      comment("please check", at(10, 0)),
      comment("Done issue, confirmed", at(11, 15)),
    ]
  }

  #[test]
  fn test_scenario_full_lifecycle() {
    let timing = compute_timing(&scenario_one()).unwrap();
    assert_eq!(timing.resolution_time_minutes, 195);
    assert_eq!(timing.first_action_time_minutes, 90);
    assert_eq!(timing.ts_resolution_time_minutes, 105);
  }

  #[test]
  fn test_unordered_input_gives_same_result() {
    let mut actions = scenario_one();
    actions.reverse();
    assert_eq!(compute_timing(&actions), compute_timing(&scenario_one()));
  }

  #[test]
  fn test_deterministic() {
    let actions = scenario_one();
    assert_eq!(compute_timing(&actions), compute_timing(&actions));
  }

  #[test]
  fn test_create_only_has_no_timing() {
    assert_eq!(compute_timing(&[create(at(8, 0))]), None);
  }

  #[test]
  fn test_empty_has_no_timing() {
    assert_eq!(compute_timing(&[]), None);
  }

  #[test]
  fn test_missing_done_comment() {
    let actions = vec![
      create(at(8, 0)),
      list_move("New Issues", "Doing", at(9, 0)),
      comment("still looking", at(10, 0)),
    ];
    assert_eq!(compute_timing(&actions), None);
  }

  #[test]
  fn test_missing_new_issues_exit() {
    let actions = vec![
      create(at(8, 0)),
      list_move("Doing", "Done", at(9, 0)),
      comment("done issue", at(10, 0)),
    ];
    assert_eq!(compute_timing(&actions), None);
  }

  #[test]
  fn test_matching_is_case_insensitive() {
    let actions = vec![
      create(at(8, 0)),
      list_move("NEW ISSUES", "Doing", at(8, 10)),
      comment("This is a DONE ISSUE now", at(8, 40)),
    ];
    let timing = compute_timing(&actions).unwrap();
    assert_eq!(timing.first_action_time_minutes, 10);
    assert_eq!(timing.ts_resolution_time_minutes, 30);
  }

  #[test]
  fn test_list_name_must_match_exactly() {
    let actions = vec![
      create(at(8, 0)),
      list_move("New Issues (old)", "Doing", at(9, 0)),
      comment("done issue", at(10, 0)),
    ];
    assert_eq!(compute_timing(&actions), None);
  }

  #[test]
  fn test_first_matching_landmarks_win() {
    let actions = vec![
      create(at(8, 0)),
      list_move("New Issues", "Doing", at(9, 0)),
      list_move("New Issues", "Doing", at(9, 30)),
      comment("done issue", at(10, 0)),
      comment("done issue again", at(11, 0)),
    ];
    let timing = compute_timing(&actions).unwrap();
    assert_eq!(timing.resolution_time_minutes, 120);
    assert_eq!(timing.first_action_time_minutes, 60);
  }

  #[test]
  fn test_undated_landmark_has_no_timing() {
    let actions = vec![
      create(at(8, 0)),
      list_move("New Issues", "Doing", at(9, 0)),
      undated_comment("done issue"),
    ];
    assert_eq!(compute_timing(&actions), None);
  }

  // Known ambiguity: the first event is the earliest action of any kind, so
  // an artifact dated before the creation shifts every metric.
  #[test]
  fn test_first_event_is_earliest_action_not_create() {
    let mut actions = scenario_one();
    actions.push(comment("imported note", at(7, 0)));

    let timing = compute_timing(&actions).unwrap();
    assert_eq!(timing.resolution_time_minutes, 255);
    assert_eq!(timing.first_action_time_minutes, 150);
    assert_eq!(timing.ts_resolution_time_minutes, 105);
  }

  #[test]
  fn test_done_before_exit_gives_negative_ts_time() {
    let actions = vec![
      create(at(8, 0)),
      comment("done issue", at(9, 0)),
      list_move("New Issues", "Done", at(9, 30)),
    ];
    let timing = compute_timing(&actions).unwrap();
    assert_eq!(timing.ts_resolution_time_minutes, -30);
    assert_eq!(timing.first_action_time_minutes, 90);
    assert_eq!(timing.resolution_time_minutes, 60);
  }

  #[test]
  fn test_seconds_are_floored_per_endpoint() {
    let actions = vec![
      create(at_secs(8, 0, 30)),
      list_move("New Issues", "Doing", at_secs(8, 1, 0)),
      comment("done issue", at_secs(8, 1, 30)),
    ];
    let timing = compute_timing(&actions).unwrap();
    assert_eq!(timing.first_action_time_minutes, 1);
    assert_eq!(timing.ts_resolution_time_minutes, 0);
    assert_eq!(timing.resolution_time_minutes, 1);
  }

  #[test]
  fn test_summary() {
    let resolved = CardBuilder::new("c1").actions(scenario_one()).build();
    let open = CardBuilder::new("c2").actions(vec![create(at(8, 0))]).build();
    let timings = timings_for(&[&resolved, &open]);

    assert_eq!(timings[0].0, "c1");
    assert!(timings[1].1.is_none());

    let summary = TimingSummary::from_timings(&timings);
    assert_eq!(summary.total_cards, 2);
    assert_eq!(summary.resolved_cards, 1);
    assert_eq!(summary.resolution.unwrap().mean, 195.0);
    assert_eq!(summary.first_action.unwrap().median, 90.0);
  }

  #[test]
  fn test_summary_median_even_count() {
    let stats = MetricStats::from_values(vec![40, 10, 20, 30]).unwrap();
    assert_eq!(stats.median, 25.0);
    assert_eq!(stats.mean, 25.0);
    assert!(MetricStats::from_values(Vec::new()).is_none());
  }

  proptest! {
    #[test]
    fn prop_split_adds_up(
      first in 0i64..86_400,
      exit in 0i64..86_400,
      done in 0i64..86_400,
    ) {
      let base = at(0, 0);
      let actions = vec![
        create(base + chrono::Duration::seconds(first)),
        list_move("New Issues", "Doing", base + chrono::Duration::seconds(exit)),
        comment("done issue", base + chrono::Duration::seconds(done)),
      ];

      if let Some(t) = compute_timing(&actions) {
        prop_assert_eq!(
          t.ts_resolution_time_minutes + t.first_action_time_minutes,
          t.resolution_time_minutes
        );
      }
    }
  }
}
