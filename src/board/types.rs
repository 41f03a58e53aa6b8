use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Id + display name pair, used for status lists and action actors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRef {
  pub id: String,
  pub name: String,
}

/// Card label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
  pub id: String,
  pub name: String,
}

/// Member reference as it appears inside an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
  pub id: String,
  pub full_name: String,
}

/// Due-date completion change recorded on a card update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueCompleteTransition {
  /// `None` when the log did not record the previous value
  pub was_complete: Option<bool>,
  pub is_complete: bool,
}

impl DueCompleteTransition {
  /// Strict false -> true transition
  pub fn is_completion(&self) -> bool {
    self.was_complete == Some(false) && self.is_complete
  }
}

/// What happened in one audit-log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
  Create,
  ListMove {
    before: Option<ListRef>,
    after: Option<ListRef>,
  },
  Comment {
    text: String,
  },
  MemberAdd {
    member: MemberRef,
  },
  MemberRemove {
    member: MemberRef,
  },
  /// Card update that did not move the card between lists
  Update,
  /// Any audit entry type we do not interpret
  Other {
    kind: String,
  },
}

/// One immutable audit-log entry for a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  pub kind: ActionKind,
  /// `None` when the source date was missing or unparseable
  pub date: Option<DateTime<Utc>>,
  pub actor: MemberRef,
  pub due_complete: Option<DueCompleteTransition>,
}

impl Action {
  pub fn is_create(&self) -> bool {
    matches!(self.kind, ActionKind::Create)
  }

  /// List moves and plain updates are the only entries that carry a
  /// due-complete transition
  pub fn is_card_update(&self) -> bool {
    matches!(self.kind, ActionKind::ListMove { .. } | ActionKind::Update)
  }
}

/// A support ticket on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
  pub id: String,
  pub name: String,
  pub list_id: String,
  pub member_ids: BTreeSet<String>,
  pub labels: Vec<Label>,
  pub is_due_complete: bool,
  pub completed_at: Option<DateTime<Utc>>,
  pub due_at: Option<DateTime<Utc>>,
  pub actions: Vec<Action>,
}

/// Role of a board member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
  #[serde(rename = "TS")]
  Ts,
  #[serde(rename = "TS-Lead")]
  TsLead,
  #[serde(rename = "CS")]
  Cs,
  #[serde(rename = "BA")]
  Ba,
  #[serde(rename = "PM")]
  Pm,
  Admin,
}

impl Role {
  /// Technical support roles, the ones selectable in the member filter
  pub fn is_support(&self) -> bool {
    matches!(self, Role::Ts | Role::TsLead)
  }
}

/// Board member from the static reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub id: String,
  pub full_name: String,
  pub role: Role,
  #[serde(default)]
  pub email: String,
}

/// Technical support sub-team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TsGroup {
  #[serde(rename = "TS1")]
  Ts1,
  #[serde(rename = "TS2")]
  Ts2,
}

impl TsGroup {
  pub fn label(&self) -> &'static str {
    match self {
      TsGroup::Ts1 => "TS1",
      TsGroup::Ts2 => "TS2",
    }
  }
}

impl fmt::Display for TsGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for TsGroup {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "TS1" => Ok(TsGroup::Ts1),
      "TS2" => Ok(TsGroup::Ts2),
      other => Err(format!("unknown team '{}', expected TS1 or TS2", other)),
    }
  }
}

/// Row of the app <-> team table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMapping {
  /// Label name with the `App:` prefix stripped
  pub label_name: String,
  pub app_name: String,
  pub ts_group: TsGroup,
  pub product_team: String,
}
