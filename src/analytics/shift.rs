use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Fine-grained operational shift (7 labels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shift {
  #[serde(rename = "Ca1")]
  Ca1,
  #[serde(rename = "Ca2")]
  Ca2,
  #[serde(rename = "Ca3")]
  Ca3,
  #[serde(rename = "Ca4")]
  Ca4,
  #[serde(rename = "Ca5.1")]
  Ca5_1,
  #[serde(rename = "Ca5.2")]
  Ca5_2,
  #[serde(rename = "Ca6")]
  Ca6,
}

impl Shift {
  pub const ALL: [Shift; 7] = [
    Shift::Ca1,
    Shift::Ca2,
    Shift::Ca3,
    Shift::Ca4,
    Shift::Ca5_1,
    Shift::Ca5_2,
    Shift::Ca6,
  ];

  /// Classify a local hour of day. Ranges are half-open.
  pub fn from_hour(hour: u32) -> Option<Shift> {
    match hour {
      0..=3 => Some(Shift::Ca1),
      4..=7 => Some(Shift::Ca2),
      8..=11 => Some(Shift::Ca3),
      12..=15 => Some(Shift::Ca4),
      16..=17 => Some(Shift::Ca5_1),
      18..=19 => Some(Shift::Ca5_2),
      20..=23 => Some(Shift::Ca6),
      _ => None,
    }
  }

  pub fn coarse(&self) -> CoarseShift {
    match self {
      Shift::Ca1 => CoarseShift::Ca1,
      Shift::Ca2 => CoarseShift::Ca2,
      Shift::Ca3 => CoarseShift::Ca3,
      Shift::Ca4 => CoarseShift::Ca4,
      Shift::Ca5_1 | Shift::Ca5_2 => CoarseShift::Ca5,
      Shift::Ca6 => CoarseShift::Ca6,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Shift::Ca1 => "Ca1",
      Shift::Ca2 => "Ca2",
      Shift::Ca3 => "Ca3",
      Shift::Ca4 => "Ca4",
      Shift::Ca5_1 => "Ca5.1",
      Shift::Ca5_2 => "Ca5.2",
      Shift::Ca6 => "Ca6",
    }
  }
}

impl fmt::Display for Shift {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Presentation shift: Ca5.1 and Ca5.2 merged into Ca5 (6 labels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoarseShift {
  Ca1,
  Ca2,
  Ca3,
  Ca4,
  Ca5,
  Ca6,
}

impl CoarseShift {
  pub const ALL: [CoarseShift; 6] = [
    CoarseShift::Ca1,
    CoarseShift::Ca2,
    CoarseShift::Ca3,
    CoarseShift::Ca4,
    CoarseShift::Ca5,
    CoarseShift::Ca6,
  ];

  /// Local hours covered by this shift
  pub fn hours(&self) -> Range<u32> {
    match self {
      CoarseShift::Ca1 => 0..4,
      CoarseShift::Ca2 => 4..8,
      CoarseShift::Ca3 => 8..12,
      CoarseShift::Ca4 => 12..16,
      CoarseShift::Ca5 => 16..20,
      CoarseShift::Ca6 => 20..24,
    }
  }

  pub fn contains(&self, shift: Shift) -> bool {
    shift.coarse() == *self
  }

  pub fn label(&self) -> &'static str {
    match self {
      CoarseShift::Ca1 => "Ca1",
      CoarseShift::Ca2 => "Ca2",
      CoarseShift::Ca3 => "Ca3",
      CoarseShift::Ca4 => "Ca4",
      CoarseShift::Ca5 => "Ca5",
      CoarseShift::Ca6 => "Ca6",
    }
  }
}

impl fmt::Display for CoarseShift {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for CoarseShift {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    CoarseShift::ALL
      .into_iter()
      .find(|shift| shift.label().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown shift '{}', expected one of Ca1..Ca6", s))
  }
}

/// Hour of day (0-23) of a timestamp in the configured local offset
pub fn local_hour(ts: &DateTime<Utc>, offset: &FixedOffset) -> u32 {
  ts.with_timezone(offset).hour()
}

/// Fine shift of a timestamp, `None` when there is no timestamp
pub fn shift_of(ts: Option<&DateTime<Utc>>, offset: &FixedOffset) -> Option<Shift> {
  ts.and_then(|ts| Shift::from_hour(local_hour(ts, offset)))
}
