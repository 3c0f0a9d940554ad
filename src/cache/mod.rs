//! In-memory cache for weather lookups
//!
//! This module provides an expiring cache keyed by city name. Entries carry the
//! time they were captured and are checked lazily on access: a stale entry stays
//! in place until a successful fetch overwrites it. Time comes from an injected
//! [`Clock`] so tests can move it by hand.

mod clock;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheEntry, WeatherCache, CACHE_TTL_SECS};
