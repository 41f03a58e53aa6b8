//! Dashboard session: one snapshot bound to the reference data.
//!
//! Answers every view query the presentation layer needs. Filtered sets and
//! heatmaps are memoized by `(snapshot version, selectors)`, so re-rendering
//! with unchanged selectors does not re-scan the card set.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::analytics::{
  apply_filters, build_heatmap, team_rollup, timings_for, CoarseShift, EventKind, FilterOption,
  FilterStage, Heatmap, ReferenceData, ResolutionTiming, Selectors, TimingSummary,
};
use crate::board::{Card, Snapshot, TsGroup};
use crate::cache::{ViewCache, ViewKey};

/// Cache keys for dashboard views.
#[derive(Clone, Debug)]
pub enum DashboardViewKey<'a> {
  /// Cards left after the filter pipeline
  Filtered {
    version: &'a str,
    selectors: &'a Selectors,
  },
  /// Heatmap over the filtered cards
  Heatmap {
    version: &'a str,
    selectors: &'a Selectors,
    kind: EventKind,
    team: Option<TsGroup>,
  },
}

impl ViewKey for DashboardViewKey<'_> {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::Filtered { version, selectors } => format!("filtered:{}:{:?}", version, selectors),
      Self::Heatmap {
        version,
        selectors,
        kind,
        team,
      } => format!(
        "heatmap:{}:{:?}:{}:{}",
        version,
        selectors,
        kind,
        team.map(|t| t.label()).unwrap_or("all")
      ),
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::Filtered { selectors, .. } => format!("filtered cards {:?}", selectors),
      Self::Heatmap {
        kind,
        team,
        selectors,
        ..
      } => match team {
        Some(t) => format!("{} {} heatmap {:?}", t, kind, selectors),
        None => format!("{} heatmap {:?}", kind, selectors),
      },
    }
  }
}

/// Timing row for one card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardTiming {
  pub card_id: String,
  pub name: String,
  pub timing: Option<ResolutionTiming>,
}

pub struct Dashboard {
  snapshot: Snapshot,
  refs: ReferenceData,
  filtered: ViewCache<Vec<usize>>,
  heatmaps: ViewCache<Heatmap>,
}

impl Dashboard {
  pub fn new(snapshot: Snapshot, refs: ReferenceData) -> Self {
    info!(
      cards = snapshot.cards.len(),
      members = refs.members.len(),
      lists = refs.lists.len(),
      "Dashboard session started"
    );
    Self {
      snapshot,
      refs,
      filtered: ViewCache::new(),
      heatmaps: ViewCache::new(),
    }
  }

  pub fn snapshot(&self) -> &Snapshot {
    &self.snapshot
  }

  pub fn refs(&self) -> &ReferenceData {
    &self.refs
  }

  /// Cards passing the filter pipeline, in snapshot order
  pub fn filtered(&self, selectors: &Selectors) -> Vec<&Card> {
    let key = DashboardViewKey::Filtered {
      version: &self.snapshot.version,
      selectors,
    };
    let cards = &self.snapshot.cards;

    let indices = self
      .filtered
      .get_or_compute(&key, || {
        // Pipeline output is an ordered subsequence of the input
        let mut kept = apply_filters(cards, selectors, &self.refs)
          .into_iter()
          .peekable();
        cards
          .iter()
          .enumerate()
          .filter_map(|(i, card)| {
            if kept.peek().is_some_and(|k| std::ptr::eq(*k, card)) {
              kept.next();
              Some(i)
            } else {
              None
            }
          })
          .collect()
      })
      .data;

    indices.iter().map(|&i| &cards[i]).collect()
  }

  pub fn heatmap(
    &self,
    selectors: &Selectors,
    kind: EventKind,
    team: Option<TsGroup>,
  ) -> Arc<Heatmap> {
    let key = DashboardViewKey::Heatmap {
      version: &self.snapshot.version,
      selectors,
      kind,
      team,
    };

    self
      .heatmaps
      .get_or_compute(&key, || {
        build_heatmap(&self.filtered(selectors), kind, team, &self.refs)
      })
      .data
  }

  pub fn shift_totals(
    &self,
    selectors: &Selectors,
    kind: EventKind,
    team: Option<TsGroup>,
  ) -> BTreeMap<CoarseShift, usize> {
    self.heatmap(selectors, kind, team).shift_totals()
  }

  pub fn team_rollup(&self, selectors: &Selectors, kind: EventKind) -> BTreeMap<String, usize> {
    team_rollup(&self.filtered(selectors), kind, &self.refs)
  }

  pub fn timings(&self, selectors: &Selectors) -> Vec<CardTiming> {
    let cards = self.filtered(selectors);
    timings_for(&cards)
      .into_iter()
      .zip(cards)
      .map(|((card_id, timing), card)| CardTiming {
        card_id,
        name: card.name.clone(),
        timing,
      })
      .collect()
  }

  pub fn timing_summary(&self, selectors: &Selectors) -> TimingSummary {
    TimingSummary::from_timings(&timings_for(&self.filtered(selectors)))
  }

  /// Selectable values for every stage, over the whole snapshot
  pub fn options(&self) -> Vec<(FilterStage, Vec<FilterOption>)> {
    FilterStage::ALL
      .iter()
      .map(|stage| (*stage, stage.options(&self.snapshot.cards, &self.refs)))
      .collect()
  }
}
