//! Card-timeline analytics engine.
//!
//! Every function here is pure: it reads cards and reference data and
//! returns derived values. Missing landmarks, unparseable dates and
//! unattributed cards degrade to `None` or empty sets.

pub mod attribution;
pub mod completion;
pub mod filters;
pub mod heatmap;
pub mod shift;
pub mod timeline;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

use chrono::FixedOffset;

use crate::board::{AppMapping, ListRef, Member};

pub use attribution::AppDirectory;
pub use completion::{completion_timestamp_of, created_timestamp_of, EventKind};
pub use filters::{apply_filters, FilterOption, FilterStage, Selectors};
pub use heatmap::{build_heatmap, team_rollup, Band, Heatmap, HeatmapCell, Sample};
pub use shift::{shift_of, CoarseShift, Shift};
pub use timeline::normalize;
pub use timing::{compute_timing, timings_for, ResolutionTiming, TimingSummary};

/// Static lookup tables plus the local clock, read-only for a session
#[derive(Debug, Clone)]
pub struct ReferenceData {
  pub members: Vec<Member>,
  pub lists: Vec<ListRef>,
  pub apps: AppDirectory,
  /// Offset used to read hours of day and shifts
  pub offset: FixedOffset,
}

impl ReferenceData {
  pub fn new(
    members: Vec<Member>,
    lists: Vec<ListRef>,
    mappings: &[AppMapping],
    offset: FixedOffset,
  ) -> Self {
    Self {
      members,
      lists,
      apps: AppDirectory::new(mappings),
      offset,
    }
  }

  pub fn member(&self, id: &str) -> Option<&Member> {
    self.members.iter().find(|m| m.id == id)
  }

  /// Display name of a status list, falling back to its id
  pub fn list_name<'a>(&'a self, id: &'a str) -> &'a str {
    self
      .lists
      .iter()
      .find(|l| l.id == id)
      .map(|l| l.name.as_str())
      .unwrap_or(id)
  }
}
