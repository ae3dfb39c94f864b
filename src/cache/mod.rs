// Cache module for in-process caching.
// Holds fetched GitHub data for the lifetime of a run, expiring entries after a fixed TTL.

pub mod clock;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use store::{CachedData, DEFAULT_TTL, TtlCache};
