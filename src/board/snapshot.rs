//! In-memory snapshot of one query window's cards.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use super::api_types::{parse_timestamp, ApiCard, ApiSnapshot};
use super::types::Card;

/// Cards fetched for a `[since, before)` window.
///
/// The card set is never patched in place; a new fetch produces a new
/// snapshot with a new `version`.
#[derive(Debug, Clone)]
pub struct Snapshot {
  pub since: Option<DateTime<Utc>>,
  pub before: Option<DateTime<Utc>>,
  pub cards: Vec<Card>,
  /// SHA-256 of the raw snapshot bytes
  pub version: String,
}

impl Snapshot {
  /// Build a snapshot from cards already held in memory.
  ///
  /// The version is derived from the card ids and action counts, which is
  /// enough to tell two fetches apart within one session.
  pub fn from_cards(cards: Vec<Card>) -> Self {
    let mut hasher = Sha256::new();
    for card in &cards {
      hasher.update(card.id.as_bytes());
      hasher.update((card.actions.len() as u64).to_le_bytes());
    }
    Self {
      since: None,
      before: None,
      cards,
      version: hex::encode(hasher.finalize()),
    }
  }

  /// Parse a snapshot from the raw export bytes
  pub fn from_json(bytes: &[u8]) -> Result<Self> {
    let parsed: ApiSnapshot =
      serde_json::from_slice(bytes).map_err(|e| eyre!("Failed to parse snapshot: {}", e))?;

    let (since, before, api_cards) = match parsed {
      ApiSnapshot::Windowed {
        since,
        before,
        cards,
      } => (
        since.as_deref().and_then(parse_timestamp),
        before.as_deref().and_then(parse_timestamp),
        cards,
      ),
      ApiSnapshot::Bare(cards) => (None, None, cards),
    };

    let cards: Vec<Card> = api_cards.into_iter().map(ApiCard::into_card).collect();

    Ok(Self {
      since,
      before,
      cards,
      version: fingerprint(bytes),
    })
  }

  /// Load a snapshot file exported by the board-query collaborator
  pub fn load(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path)
      .map_err(|e| eyre!("Failed to read snapshot {}: {}", path.display(), e))?;

    let snapshot = Self::from_json(&bytes)
      .map_err(|e| eyre!("Invalid snapshot {}: {}", path.display(), e))?;

    info!(
      path = %path.display(),
      cards = snapshot.cards.len(),
      version = %&snapshot.version[..12],
      "Loaded snapshot"
    );

    Ok(snapshot)
  }
}

fn fingerprint(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_version_tracks_content() {
    let a = Snapshot::from_json(br#"[{ "id": "c1" }]"#).unwrap();
    let b = Snapshot::from_json(br#"[{ "id": "c1" }]"#).unwrap();
    let c = Snapshot::from_json(br#"[{ "id": "c2" }]"#).unwrap();

    assert_eq!(a.version, b.version);
    assert_ne!(a.version, c.version);
    assert_eq!(a.version.len(), 64);
  }

  #[test]
  fn test_window_bounds_are_parsed() {
    let snapshot = Snapshot::from_json(
      br#"{ "since": "2024-03-01T00:00:00Z", "before": "2024-03-02T00:00:00Z", "cards": [{ "id": "c1" }] }"#,
    )
    .unwrap();

    assert!(snapshot.since.is_some());
    assert!(snapshot.before.is_some());
    assert_eq!(snapshot.cards.len(), 1);
  }

  #[test]
  fn test_invalid_json_is_an_error() {
    assert!(Snapshot::from_json(b"{ not json").is_err());
  }

  #[test]
  fn test_from_cards_versions_differ() {
    let a = Snapshot::from_json(br#"[{ "id": "c1" }]"#).unwrap();
    let b = Snapshot::from_cards(a.cards.clone());
    let c = Snapshot::from_cards(Vec::new());
    assert_ne!(b.version, c.version);
  }
}
