//! Builders shared by the analytics unit tests.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::collections::BTreeSet;

use super::ReferenceData;
use crate::board::{
  Action, ActionKind, AppMapping, Card, DueCompleteTransition, Label, ListRef, Member, MemberRef,
  Role, TsGroup,
};

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
  at_secs(hour, minute, 0)
}

pub fn at_secs(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(2024, 3, 1, hour, minute, second)
    .unwrap()
}

fn actor(name: &str) -> MemberRef {
  MemberRef {
    id: format!("id-{}", name.to_lowercase()),
    full_name: name.to_string(),
  }
}

fn action(kind: ActionKind, date: Option<DateTime<Utc>>) -> Action {
  Action {
    kind,
    date,
    actor: actor("Alice"),
    due_complete: None,
  }
}

pub fn create(date: DateTime<Utc>) -> Action {
  action(ActionKind::Create, Some(date))
}

pub fn undated_create() -> Action {
  action(ActionKind::Create, None)
}

pub fn comment(text: &str, date: DateTime<Utc>) -> Action {
  action(
    ActionKind::Comment {
      text: text.to_string(),
    },
    Some(date),
  )
}

pub fn undated_comment(text: &str) -> Action {
  action(
    ActionKind::Comment {
      text: text.to_string(),
    },
    None,
  )
}

fn list(name: &str) -> ListRef {
  ListRef {
    id: format!("list-{}", name.to_lowercase().replace(' ', "-")),
    name: name.to_string(),
  }
}

pub fn list_move(before: &str, after: &str, date: DateTime<Utc>) -> Action {
  action(
    ActionKind::ListMove {
      before: Some(list(before)),
      after: Some(list(after)),
    },
    Some(date),
  )
}

pub fn list_move_with_due(
  before: &str,
  after: &str,
  was_complete: Option<bool>,
  is_complete: bool,
  date: DateTime<Utc>,
) -> Action {
  Action {
    due_complete: Some(DueCompleteTransition {
      was_complete,
      is_complete,
    }),
    ..list_move(before, after, date)
  }
}

pub fn due_update(was_complete: Option<bool>, is_complete: bool, date: DateTime<Utc>) -> Action {
  Action {
    due_complete: Some(DueCompleteTransition {
      was_complete,
      is_complete,
    }),
    ..action(ActionKind::Update, Some(date))
  }
}

/// Member removal performed by `actor_name`
pub fn member_remove(actor_name: &str, removed: &str, date: DateTime<Utc>) -> Action {
  Action {
    actor: actor(actor_name),
    ..action(
      ActionKind::MemberRemove {
        member: actor(removed),
      },
      Some(date),
    )
  }
}

pub fn mapping(label: &str, app: &str, group: TsGroup, team: &str) -> AppMapping {
  AppMapping {
    label_name: label.to_string(),
    app_name: app.to_string(),
    ts_group: group,
    product_team: team.to_string(),
  }
}

pub fn card_with_labels(id: &str, labels: &[&str]) -> Card {
  CardBuilder::new(id).labels(labels).build()
}

pub fn reference_data() -> ReferenceData {
  ReferenceData::new(
    vec![
      Member {
        id: "m-alice".to_string(),
        full_name: "Alice".to_string(),
        role: Role::Ts,
        email: "alice@example.com".to_string(),
      },
      Member {
        id: "m-bob".to_string(),
        full_name: "Bob".to_string(),
        role: Role::TsLead,
        email: "bob@example.com".to_string(),
      },
      Member {
        id: "m-carol".to_string(),
        full_name: "Carol".to_string(),
        role: Role::Pm,
        email: "carol@example.com".to_string(),
      },
    ],
    vec![
      ListRef {
        id: "l-new".to_string(),
        name: "New Issues".to_string(),
      },
      ListRef {
        id: "l-done".to_string(),
        name: "Done".to_string(),
      },
    ],
    &[
      mapping("Checkout", "Checkout", TsGroup::Ts1, "Payments"),
      mapping("Search", "Search", TsGroup::Ts2, "Discovery"),
    ],
    FixedOffset::east_opt(0).unwrap(),
  )
}

pub struct CardBuilder {
  card: Card,
}

impl CardBuilder {
  pub fn new(id: &str) -> Self {
    Self {
      card: Card {
        id: id.to_string(),
        name: format!("Card {}", id),
        list_id: "l-new".to_string(),
        member_ids: BTreeSet::new(),
        labels: Vec::new(),
        is_due_complete: false,
        completed_at: None,
        due_at: None,
        actions: Vec::new(),
      },
    }
  }

  pub fn list(mut self, list_id: &str) -> Self {
    self.card.list_id = list_id.to_string();
    self
  }

  pub fn members(mut self, ids: &[&str]) -> Self {
    self.card.member_ids = ids.iter().map(|s| s.to_string()).collect();
    self
  }

  pub fn labels(mut self, names: &[&str]) -> Self {
    self.card.labels = names
      .iter()
      .enumerate()
      .map(|(i, name)| Label {
        id: format!("label-{}", i),
        name: name.to_string(),
      })
      .collect();
    self
  }

  pub fn due_complete(mut self, done: bool) -> Self {
    self.card.is_due_complete = done;
    self
  }

  pub fn completed_at(mut self, ts: DateTime<Utc>) -> Self {
    self.card.completed_at = Some(ts);
    self
  }

  pub fn due_at(mut self, ts: DateTime<Utc>) -> Self {
    self.card.due_at = Some(ts);
    self
  }

  pub fn actions(mut self, actions: Vec<Action>) -> Self {
    self.card.actions = actions;
    self
  }

  pub fn build(self) -> Card {
    self.card
  }
}
