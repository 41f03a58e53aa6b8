//! Hour-of-day heatmaps and their shift and team roll-ups.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::completion::EventKind;
use super::shift::{local_hour, CoarseShift};
use super::ReferenceData;
use crate::board::{Card, TsGroup};

pub const HOURS_PER_DAY: usize = 24;

/// Card shown in a heatmap cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
  pub card_id: String,
  pub name: String,
  pub timestamp: DateTime<Utc>,
  pub member_names: Vec<String>,
}

/// One hour bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
  pub hour: u32,
  pub count: usize,
  /// Every card in the bucket; truncating for display is the caller's job
  pub samples: Vec<Sample>,
}

/// Ordinal colour band of a cell count.
///
/// Boundaries: 0 / 1-2 / 3-5 / 6-10 / 11-15 / 16-20 / >20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Band(pub u8);

const COMPLETED_PALETTE: [&str; 7] = [
  "#f5f5f5", "#d9f0d3", "#aedea7", "#73c378", "#3f9f54", "#1e7b3a", "#00441b",
];

const CREATED_PALETTE: [&str; 7] = [
  "#f5f5f5", "#deebf7", "#b6d4ea", "#82badb", "#4a98c9", "#2171b5", "#08306b",
];

impl Band {
  pub fn for_count(count: usize) -> Band {
    match count {
      0 => Band(0),
      1..=2 => Band(1),
      3..=5 => Band(2),
      6..=10 => Band(3),
      11..=15 => Band(4),
      16..=20 => Band(5),
      _ => Band(6),
    }
  }

  /// Hex colour of this band; created and completed maps use separate palettes
  pub fn color(&self, kind: EventKind) -> &'static str {
    let palette = match kind {
      EventKind::Completed => &COMPLETED_PALETTE,
      EventKind::Created => &CREATED_PALETTE,
    };
    palette[usize::from(self.0).min(palette.len() - 1)]
  }
}

/// Events per local hour for one event kind, optionally scoped to a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heatmap {
  pub kind: EventKind,
  pub team: Option<TsGroup>,
  pub cells: Vec<HeatmapCell>,
}

impl Heatmap {
  fn empty(kind: EventKind, team: Option<TsGroup>) -> Self {
    Self {
      kind,
      team,
      cells: (0..HOURS_PER_DAY as u32)
        .map(|hour| HeatmapCell {
          hour,
          count: 0,
          samples: Vec::new(),
        })
        .collect(),
    }
  }

  pub fn count(&self, hour: u32) -> usize {
    self
      .cells
      .get(hour as usize)
      .map(|c| c.count)
      .unwrap_or(0)
  }

  pub fn total(&self) -> usize {
    self.cells.iter().map(|c| c.count).sum()
  }

  pub fn band(&self, hour: u32) -> Band {
    Band::for_count(self.count(hour))
  }

  /// Sum of the hour counts inside each coarse shift
  pub fn shift_totals(&self) -> BTreeMap<CoarseShift, usize> {
    CoarseShift::ALL
      .iter()
      .map(|shift| (*shift, shift.hours().map(|h| self.count(h)).sum()))
      .collect()
  }
}

fn member_names(card: &Card, refs: &ReferenceData) -> Vec<String> {
  card
    .member_ids
    .iter()
    .filter_map(|id| refs.member(id))
    .map(|m| m.full_name.clone())
    .collect()
}

/// Bucket cards by the local hour of their event.
///
/// With a team, only cards attributed to that team are counted. Cards
/// without an event timestamp are skipped.
pub fn build_heatmap(
  cards: &[&Card],
  kind: EventKind,
  team: Option<TsGroup>,
  refs: &ReferenceData,
) -> Heatmap {
  let mut heatmap = Heatmap::empty(kind, team);

  let candidates = cards
    .iter()
    .filter(|card| team.map_or(true, |group| refs.apps.belongs_to(card, group)));

  for card in candidates {
    let Some(timestamp) = kind.timestamp_of(card) else {
      continue;
    };
    let cell = &mut heatmap.cells[local_hour(&timestamp, &refs.offset) as usize];
    cell.count += 1;
    cell.samples.push(Sample {
      card_id: card.id.clone(),
      name: card.name.clone(),
      timestamp,
      member_names: member_names(card, refs),
    });
  }

  heatmap
}

/// Cards with a resolvable event per product team.
///
/// A card attributed to several teams counts once for each of them.
pub fn team_rollup(cards: &[&Card], kind: EventKind, refs: &ReferenceData) -> BTreeMap<String, usize> {
  let mut totals: BTreeMap<String, usize> = refs.apps.teams().into_iter().map(|t| (t, 0)).collect();

  for card in cards.iter().filter(|card| kind.timestamp_of(card).is_some()) {
    for team in refs.apps.teams_of(card) {
      *totals.entry(team).or_default() += 1;
    }
  }

  totals
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analytics::testing::{at, create, due_update, reference_data, CardBuilder};

  #[test]
  fn test_two_cards_at_sixteen() {
    let cards = vec![
      CardBuilder::new("c1").actions(vec![create(at(16, 5))]).build(),
      CardBuilder::new("c2").actions(vec![create(at(16, 55))]).build(),
    ];
    let refs: Vec<&Card> = cards.iter().collect();

    let heatmap = build_heatmap(&refs, EventKind::Created, None, &reference_data());
    assert_eq!(heatmap.cells.len(), 24);
    assert_eq!(heatmap.count(16), 2);
    assert_eq!(heatmap.total(), 2);
    assert_eq!(heatmap.shift_totals()[&CoarseShift::Ca5], 2);
    assert_eq!(heatmap.shift_totals()[&CoarseShift::Ca4], 0);
  }

  #[test]
  fn test_samples_carry_member_names() {
    let cards = vec![CardBuilder::new("c1")
      .members(&["m-alice", "m-unknown"])
      .actions(vec![create(at(3, 0))])
      .build()];
    let refs: Vec<&Card> = cards.iter().collect();

    let heatmap = build_heatmap(&refs, EventKind::Created, None, &reference_data());
    let sample = &heatmap.cells[3].samples[0];
    assert_eq!(sample.card_id, "c1");
    assert_eq!(sample.timestamp, at(3, 0));
    assert_eq!(sample.member_names, vec!["Alice".to_string()]);
  }

  #[test]
  fn test_not_due_complete_never_in_completed_heatmap() {
    let cards = vec![CardBuilder::new("c1")
      .due_complete(false)
      .completed_at(at(10, 0))
      .actions(vec![create(at(9, 0)), due_update(Some(false), true, at(10, 0))])
      .build()];
    let refs: Vec<&Card> = cards.iter().collect();

    let heatmap = build_heatmap(&refs, EventKind::Completed, None, &reference_data());
    assert_eq!(heatmap.total(), 0);
  }

  #[test]
  fn test_team_scope() {
    let cards = vec![CardBuilder::new("c1")
      .labels(&["App: Checkout"])
      .actions(vec![create(at(9, 0))])
      .build()];
    let refs: Vec<&Card> = cards.iter().collect();
    let data = reference_data();

    let ts1 = build_heatmap(&refs, EventKind::Created, Some(TsGroup::Ts1), &data);
    let ts2 = build_heatmap(&refs, EventKind::Created, Some(TsGroup::Ts2), &data);
    assert_eq!(ts1.count(9), 1);
    assert_eq!(ts2.total(), 0);
  }

  #[test]
  fn test_cards_without_timestamp_are_skipped() {
    let cards = vec![CardBuilder::new("c1").build()];
    let refs: Vec<&Card> = cards.iter().collect();
    let heatmap = build_heatmap(&refs, EventKind::Created, None, &reference_data());
    assert_eq!(heatmap.total(), 0);
  }

  #[test]
  fn test_band_boundaries() {
    let expected = [
      (0, 0),
      (1, 1),
      (2, 1),
      (3, 2),
      (5, 2),
      (6, 3),
      (10, 3),
      (11, 4),
      (15, 4),
      (16, 5),
      (20, 5),
      (21, 6),
      (500, 6),
    ];
    for (count, band) in expected {
      assert_eq!(Band::for_count(count), Band(band), "count {}", count);
    }
  }

  #[test]
  fn test_palettes_share_boundaries() {
    assert_eq!(Band(0).color(EventKind::Created), "#f5f5f5");
    assert_eq!(Band(6).color(EventKind::Completed), "#00441b");
    assert_eq!(Band(6).color(EventKind::Created), "#08306b");
    assert_ne!(Band(3).color(EventKind::Created), Band(3).color(EventKind::Completed));
  }

  #[test]
  fn test_team_rollup_counts_every_team() {
    let cards = vec![
      CardBuilder::new("c1")
        .labels(&["App: Checkout", "App: Search"])
        .actions(vec![create(at(9, 0))])
        .build(),
      CardBuilder::new("c2")
        .labels(&["App: Checkout"])
        .actions(vec![create(at(10, 0))])
        .build(),
      CardBuilder::new("c3").labels(&["App: Search"]).build(),
    ];
    let refs: Vec<&Card> = cards.iter().collect();

    let rollup = team_rollup(&refs, EventKind::Created, &reference_data());
    assert_eq!(rollup["Payments"], 2);
    assert_eq!(rollup["Discovery"], 1);
  }
}
