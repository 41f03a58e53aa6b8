//! Core traits and types for the view cache.

/// Key identifying one derived view.
///
/// Keys must include the snapshot version so that views computed from an
/// older card set never match.
pub trait ViewKey {
  /// Stable, fixed-length hash used as the storage key
  fn cache_hash(&self) -> String;

  /// Human-readable description for logging
  fn description(&self) -> String;
}

/// Result from a cache lookup, including where the value came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  pub fn computed(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Computed,
    }
  }

  pub fn cached(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Cached,
    }
  }
}

/// Indicates where a view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Computed on this call
  Computed,
  /// Served from an earlier computation
  Cached,
}
