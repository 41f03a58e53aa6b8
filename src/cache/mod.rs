//! Memoization of derived views.
//!
//! Every view is recomputed from scratch on a miss; there is no incremental
//! update. Keys carry the snapshot version, so a fresh fetch never reuses a
//! view computed from the previous card set.

mod layer;
mod traits;

pub use layer::ViewCache;
pub use traits::{CacheResult, CacheSource, ViewKey};
