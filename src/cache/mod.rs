//! Cache Module
//!
//! Embedded cache with per-entry expiry, the key namespace used to address
//! it, the invalidation rules applied after writes, and the read-through
//! helper used by every read path.

mod clock;
mod entry;
mod invalidation;
mod keys;
mod read_through;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use invalidation::{invalidation_set, Invalidator, Mutation};
pub use keys::{CacheKey, EntityKind};
pub use read_through::ReadThrough;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// TTL applied to every read-through populate unless configured otherwise.
pub const DEFAULT_TTL_SECS: u64 = 30 * 60;
