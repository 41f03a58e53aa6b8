//! Plain-text tables for the command line.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::analytics::timing::MetricStats;
use crate::analytics::{
  CoarseShift, FilterOption, FilterStage, Heatmap, ReferenceData, TimingSummary,
};
use crate::board::Card;
use crate::dashboard::CardTiming;

/// Samples listed per heatmap cell
pub const SAMPLES_PER_CELL: usize = 5;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

fn minutes(value: Option<i64>) -> String {
  value.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string())
}

fn stats_row(out: &mut String, name: &str, stats: Option<MetricStats>) {
  let _ = match stats {
    Some(s) => writeln!(out, "  {:<14} mean {:>9.1}  median {:>9.1}", name, s.mean, s.median),
    None => writeln!(out, "  {:<14} -", name),
  };
}

pub fn render_timings(rows: &[CardTiming], summary: &TimingSummary) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<12} {:<40} {:>10} {:>10} {:>10}",
    "CARD", "NAME", "RESOLVE", "TS", "FIRST"
  );

  for row in rows {
    let _ = writeln!(
      out,
      "{:<12} {:<40} {:>10} {:>10} {:>10}",
      truncate(&row.card_id, 12),
      truncate(&row.name, 40),
      minutes(row.timing.map(|t| t.resolution_time_minutes)),
      minutes(row.timing.map(|t| t.ts_resolution_time_minutes)),
      minutes(row.timing.map(|t| t.first_action_time_minutes)),
    );
  }

  let _ = writeln!(
    out,
    "\n{} of {} cards resolved (minutes)",
    summary.resolved_cards, summary.total_cards
  );
  stats_row(&mut out, "resolution", summary.resolution);
  stats_row(&mut out, "ts resolution", summary.ts_resolution);
  stats_row(&mut out, "first action", summary.first_action);
  out
}

pub fn render_heatmap(heatmap: &Heatmap) -> String {
  let mut out = String::new();
  let scope = heatmap.team.map(|t| t.label()).unwrap_or("all teams");
  let _ = writeln!(out, "{} per hour, {}", heatmap.kind, scope);
  let _ = writeln!(out, "{:<6} {:>6} {:>5} {:<8} SAMPLES", "HOUR", "COUNT", "BAND", "COLOR");

  for cell in &heatmap.cells {
    let band = heatmap.band(cell.hour);
    let mut samples: Vec<String> = cell
      .samples
      .iter()
      .take(SAMPLES_PER_CELL)
      .map(|s| truncate(&s.name, 24))
      .collect();
    if cell.samples.len() > SAMPLES_PER_CELL {
      samples.push(format!("+{} more", cell.samples.len() - SAMPLES_PER_CELL));
    }

    let _ = writeln!(
      out,
      "{:02}:00  {:>6} {:>5} {:<8} {}",
      cell.hour,
      cell.count,
      band.0,
      band.color(heatmap.kind),
      samples.join(", ")
    );
  }

  let _ = writeln!(out, "total {}", heatmap.total());
  out
}

pub fn render_shift_totals(totals: &BTreeMap<CoarseShift, usize>) -> String {
  let mut out = String::new();
  for (shift, count) in totals {
    let hours = shift.hours();
    let _ = writeln!(
      out,
      "{:<4} {:02}-{:02}  {:>6}",
      shift.label(),
      hours.start,
      hours.end,
      count
    );
  }
  out
}

pub fn render_team_rollup(rollup: &BTreeMap<String, usize>) -> String {
  let mut out = String::new();
  for (team, count) in rollup {
    let _ = writeln!(out, "{:<24} {:>6}", truncate(team, 24), count);
  }
  out
}

pub fn render_cards(cards: &[&Card], refs: &ReferenceData) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{:<12} {:<40} {:<16} MEMBERS", "CARD", "NAME", "STATUS");

  for card in cards {
    let members: Vec<&str> = card
      .member_ids
      .iter()
      .map(|id| refs.member(id).map(|m| m.full_name.as_str()).unwrap_or(id))
      .collect();
    let _ = writeln!(
      out,
      "{:<12} {:<40} {:<16} {}",
      truncate(&card.id, 12),
      truncate(&card.name, 40),
      truncate(refs.list_name(&card.list_id), 16),
      members.join(", ")
    );
  }

  let _ = writeln!(out, "{} cards", cards.len());
  out
}

pub fn render_options(options: &[(FilterStage, Vec<FilterOption>)]) -> String {
  let mut out = String::new();
  for (stage, values) in options {
    let _ = writeln!(out, "{}:", stage.label());
    if values.is_empty() {
      let _ = writeln!(out, "  (none)");
    }
    for option in values {
      if option.value == option.label {
        let _ = writeln!(out, "  {}", option.value);
      } else {
        let _ = writeln!(out, "  {:<28} {}", option.value, option.label);
      }
    }
  }
  out
}
