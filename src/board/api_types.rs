//! Serde-deserializable types matching the board export format.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on what the analytics need.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

use super::types::{
  Action, ActionKind, Card, DueCompleteTransition, Label, ListRef, MemberRef,
};

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiListRef {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiMember {
  #[serde(default)]
  pub id: String,
  /// Actor records use `fullName`, member payloads use `name`
  #[serde(rename = "fullName", alias = "name", default)]
  pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiLabel {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiDueState {
  #[serde(rename = "dueComplete")]
  pub due_complete: Option<bool>,
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ApiActionData {
  #[serde(rename = "listBefore")]
  pub list_before: Option<ApiListRef>,
  #[serde(rename = "listAfter")]
  pub list_after: Option<ApiListRef>,
  pub text: Option<String>,
  pub member: Option<ApiMember>,
  #[serde(rename = "idMember")]
  pub id_member: Option<String>,
  pub card: Option<ApiDueState>,
  pub old: Option<ApiDueState>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAction {
  #[serde(rename = "type", default)]
  pub action_type: String,
  pub date: Option<String>,
  #[serde(rename = "idMemberCreator", default)]
  pub id_member_creator: String,
  #[serde(rename = "memberCreator")]
  pub member_creator: Option<ApiMember>,
  #[serde(default)]
  pub data: ApiActionData,
}

// ============================================================================
// Cards
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCard {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "idList", default)]
  pub id_list: String,
  #[serde(rename = "idMembers", default)]
  pub id_members: Vec<String>,
  #[serde(default)]
  pub labels: Vec<ApiLabel>,
  #[serde(rename = "dueComplete", default)]
  pub due_complete: bool,
  #[serde(rename = "dateCompleted")]
  pub date_completed: Option<String>,
  pub due: Option<String>,
  #[serde(default)]
  pub actions: Vec<ApiAction>,
}

/// Snapshot file body: either a bare card array or a windowed envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiSnapshot {
  Windowed {
    since: Option<String>,
    before: Option<String>,
    cards: Vec<ApiCard>,
  },
  Bare(Vec<ApiCard>),
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiListRef> for ListRef {
  fn from(list: ApiListRef) -> Self {
    ListRef {
      id: list.id,
      name: list.name,
    }
  }
}

impl From<ApiMember> for MemberRef {
  fn from(member: ApiMember) -> Self {
    MemberRef {
      id: member.id,
      full_name: member.full_name,
    }
  }
}

impl ApiAction {
  pub fn into_action(self) -> Action {
    let date = self.date.as_deref().and_then(parse_timestamp);

    let actor = match self.member_creator {
      Some(creator) => {
        let mut actor = MemberRef::from(creator);
        if actor.id.is_empty() {
          actor.id = self.id_member_creator;
        }
        actor
      }
      None => MemberRef {
        id: self.id_member_creator,
        full_name: String::new(),
      },
    };

    let data = self.data;
    let due_complete = extract_due_transition(&data);

    let kind = match self.action_type.as_str() {
      "createCard" => ActionKind::Create,
      "updateCard" if data.list_before.is_some() || data.list_after.is_some() => {
        ActionKind::ListMove {
          before: data.list_before.map(ListRef::from),
          after: data.list_after.map(ListRef::from),
        }
      }
      "updateCard" => ActionKind::Update,
      "commentCard" => ActionKind::Comment {
        text: data.text.unwrap_or_default(),
      },
      "addMemberToCard" => ActionKind::MemberAdd {
        member: extract_member(data.member, data.id_member),
      },
      "removeMemberFromCard" => ActionKind::MemberRemove {
        member: extract_member(data.member, data.id_member),
      },
      other => ActionKind::Other {
        kind: other.to_string(),
      },
    };

    Action {
      kind,
      date,
      actor,
      due_complete,
    }
  }
}

impl ApiCard {
  pub fn into_card(self) -> Card {
    Card {
      completed_at: self.date_completed.as_deref().and_then(parse_timestamp),
      due_at: self.due.as_deref().and_then(parse_timestamp),
      id: self.id,
      name: self.name,
      list_id: self.id_list,
      member_ids: self.id_members.into_iter().collect::<BTreeSet<_>>(),
      labels: self
        .labels
        .into_iter()
        .map(|l| Label {
          id: l.id,
          name: l.name,
        })
        .collect(),
      is_due_complete: self.due_complete,
      actions: self
        .actions
        .into_iter()
        .map(ApiAction::into_action)
        .collect(),
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse an export timestamp.
///
/// Accepts RFC 3339 and offset-less ISO 8601 (read as UTC). Anything else is
/// treated as a missing date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }

  if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }

  debug!("Ignoring unparseable timestamp '{}'", raw);
  None
}

/// Member payloads sometimes carry only `idMember`
fn extract_member(member: Option<ApiMember>, id_member: Option<String>) -> MemberRef {
  let mut member = member.map(MemberRef::from).unwrap_or(MemberRef {
    id: String::new(),
    full_name: String::new(),
  });
  if member.id.is_empty() {
    member.id = id_member.unwrap_or_default();
  }
  member
}

/// A transition exists when the updated card state reports `dueComplete`
fn extract_due_transition(data: &ApiActionData) -> Option<DueCompleteTransition> {
  let is_complete = data.card.as_ref()?.due_complete?;
  let was_complete = data.old.as_ref().and_then(|old| old.due_complete);
  Some(DueCompleteTransition {
    was_complete,
    is_complete,
  })
}
