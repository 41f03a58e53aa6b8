//! In-memory cache of derived views.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::traits::{CacheResult, ViewKey};

/// Memoizes views by key.
///
/// Values are shared behind `Arc` so a cached view can be handed out without
/// cloning it. Views are pure functions of their key, so an entry never goes
/// stale while its key still matches.
pub struct ViewCache<T> {
  entries: Arc<Mutex<HashMap<String, Arc<T>>>>,
}

impl<T> ViewCache<T> {
  pub fn new() -> Self {
    Self {
      entries: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  // A panic while computing a view cannot leave a half-written entry, so a
  // poisoned lock still holds consistent data.
  fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<T>>> {
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Return the cached view for `key`, computing and storing it on a miss.
  ///
  /// The lock is not held while `compute` runs.
  pub fn get_or_compute<K, F>(&self, key: &K, compute: F) -> CacheResult<Arc<T>>
  where
    K: ViewKey,
    F: FnOnce() -> T,
  {
    let hash = key.cache_hash();

    if let Some(hit) = self.lock().get(&hash) {
      debug!("View cache hit: {}", key.description());
      return CacheResult::cached(Arc::clone(hit));
    }

    debug!("View cache miss: {}", key.description());
    let value = Arc::new(compute());
    self.lock().insert(hash, Arc::clone(&value));
    CacheResult::computed(value)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn clear(&self) {
    self.lock().clear();
  }
}

impl<T> Default for ViewCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for ViewCache<T> {
  fn clone(&self) -> Self {
    Self {
      entries: Arc::clone(&self.entries),
    }
  }
}
