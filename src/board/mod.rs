//! Board data model and the snapshot adapter that populates it.

pub mod api_types;
pub mod snapshot;
pub mod types;

pub use snapshot::Snapshot;
pub use types::{
  Action, ActionKind, AppMapping, Card, DueCompleteTransition, Label, ListRef, Member, MemberRef,
  Role, TsGroup,
};
