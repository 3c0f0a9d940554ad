//! Expiring cache in front of the weather fetcher
//!
//! Provides a `WeatherCache` that keeps the last successful lookup per city
//! together with its capture time, and only calls the fetcher when that entry
//! is missing or older than the TTL.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::data::{FetchError, FetchWeather, WeatherRecord};

/// How long a cached lookup stays fresh, in seconds
pub const CACHE_TTL_SECS: i64 = 600;

/// One cached lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The cached weather
    pub record: WeatherRecord,
    /// When the weather was fetched
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is fresh while `now - cached_at < ttl`
    ///
    /// A `now` earlier than `cached_at` counts as fresh.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.cached_at) >= ttl
    }
}

/// Time-based cache of weather records keyed by city
///
/// Holds at most one entry per city. Nothing is ever evicted: a stale entry is
/// left in place until a later successful fetch overwrites it, and a failed
/// fetch leaves it untouched.
///
/// `get_or_fetch` takes `&mut self`, so one cache cannot serve two lookups at
/// once. Callers that share a cache between tasks have to serialise access
/// themselves; two misses for the same city that race on separate caches or
/// behind a coarse lock both reach the fetcher, and the later completion wins.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherCache {
    /// Creates an empty cache with the standard ten-minute TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(CACHE_TTL_SECS))
    }

    /// Creates an empty cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of cities with an entry, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current entry for `city`, regardless of freshness
    pub fn entry(&self, city: &str) -> Option<&CacheEntry> {
        self.entries.get(city)
    }

    /// Stores `record` for `city`, replacing any previous entry
    pub fn write(&mut self, city: &str, record: WeatherRecord, now: DateTime<Utc>) {
        self.entries.insert(
            city.to_string(),
            CacheEntry {
                record,
                cached_at: now,
            },
        );
    }

    /// Returns the weather for `city`, fetching only when needed
    ///
    /// # Arguments
    /// * `city` - Cache key, already checked against the allow-list
    /// * `now` - Current time, used both for the freshness check and as the
    ///   capture time of a new entry
    /// * `fetcher` - Called at most once, on a miss or a stale entry
    ///
    /// # Returns
    /// * `Ok(WeatherRecord)` from the cache or from a successful fetch
    /// * `Err(FetchError)` if the fetch failed; any stale entry is kept but
    ///   not returned
    pub async fn get_or_fetch(
        &mut self,
        city: &str,
        now: DateTime<Utc>,
        fetcher: &dyn FetchWeather,
    ) -> Result<WeatherRecord, FetchError> {
        if let Some(entry) = self.entries.get(city) {
            if !entry.is_expired(now, self.ttl) {
                info!(city, "CACHE HIT: weather served from cache");
                return Ok(entry.record.clone());
            }
            info!(city, "CACHE EXPIRED: weather is out of date, requesting API");
        }

        let started = Instant::now();
        match fetcher.fetch(city).await {
            Ok(record) => {
                info!(
                    city,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "API SUCCESS: weather refreshed in cache"
                );
                self.write(city, record.clone(), now);
                Ok(record)
            }
            Err(err) => {
                error!(city, error = %err, "API FAILURE: weather fetch failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fetcher that replays scripted results and counts calls
    struct ScriptedFetcher {
        results: Mutex<VecDeque<Result<WeatherRecord, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(results: Vec<Result<WeatherRecord, FetchError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FetchWeather for ScriptedFetcher {
        async fn fetch(&self, _city: &str) -> Result<WeatherRecord, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetcher called more often than scripted")
        }
    }

    fn record(city: &str, temperature: f64) -> WeatherRecord {
        WeatherRecord {
            city: city.to_string(),
            temperature,
            humidity: 60,
            description: "Overcast clouds".to_string(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let mut cache = WeatherCache::new();
        let fetcher = ScriptedFetcher::new(vec![Ok(record("Kyiv", 20.0))]);

        let result = cache.get_or_fetch("Kyiv", t0(), &fetcher).await;

        assert_eq!(result, Ok(record("Kyiv", 20.0)));
        assert_eq!(fetcher.calls(), 1);
        let entry = cache.entry("Kyiv").expect("entry should be stored");
        assert_eq!(entry.cached_at, t0());
    }

    #[tokio::test]
    async fn test_hit_just_before_ttl_skips_fetcher() {
        let mut cache = WeatherCache::new();
        cache.write("Kyiv", record("Kyiv", 20.0), t0());
        let fetcher = ScriptedFetcher::new(vec![]);

        let result = cache.get_or_fetch("Kyiv", t0() + secs(599), &fetcher).await;

        assert_eq!(result, Ok(record("Kyiv", 20.0)));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_entry_at_exactly_ttl_is_stale() {
        let mut cache = WeatherCache::new();
        cache.write("Kyiv", record("Kyiv", 20.0), t0());
        let fetcher = ScriptedFetcher::new(vec![Ok(record("Kyiv", 22.0))]);

        let result = cache.get_or_fetch("Kyiv", t0() + secs(600), &fetcher).await;

        assert_eq!(result, Ok(record("Kyiv", 22.0)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_overwritten_with_fresh_timestamp() {
        let mut cache = WeatherCache::new();
        cache.write("Kyiv", record("Kyiv", 20.0), t0());
        let fetcher = ScriptedFetcher::new(vec![Ok(record("Kyiv", 14.0))]);

        let later = t0() + secs(601);
        cache.get_or_fetch("Kyiv", later, &fetcher).await.unwrap();

        let entry = cache.entry("Kyiv").unwrap();
        assert_eq!(entry.record, record("Kyiv", 14.0));
        assert_eq!(entry.cached_at, later);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_empty() {
        let mut cache = WeatherCache::new();
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::ApiError(404))]);

        let result = cache.get_or_fetch("Berlin", t0(), &fetcher).await;

        assert_eq!(result, Err(FetchError::ApiError(404)));
        assert!(cache.entry("Berlin").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_entry_but_reports_error() {
        let mut cache = WeatherCache::new();
        cache.write("Lviv", record("Lviv", 18.0), t0());
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::ConnectionError(
            "connection refused".to_string(),
        ))]);

        let result = cache.get_or_fetch("Lviv", t0() + secs(900), &fetcher).await;

        assert!(matches!(result, Err(FetchError::ConnectionError(_))));
        let entry = cache.entry("Lviv").expect("stale entry should survive");
        assert_eq!(entry.record, record("Lviv", 18.0));
        assert_eq!(entry.cached_at, t0());
    }

    #[tokio::test]
    async fn test_entries_are_per_city() {
        let mut cache = WeatherCache::new();
        let fetcher = ScriptedFetcher::new(vec![Ok(record("Kyiv", 20.0)), Ok(record("Lviv", 17.0))]);

        cache.get_or_fetch("Kyiv", t0(), &fetcher).await.unwrap();
        let lviv = cache.get_or_fetch("Lviv", t0() + secs(10), &fetcher).await;

        assert_eq!(lviv, Ok(record("Lviv", 17.0)));
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let mut cache = WeatherCache::with_ttl(secs(30));
        cache.write("Dnipro", record("Dnipro", 25.0), t0());
        let fetcher = ScriptedFetcher::new(vec![Ok(record("Dnipro", 26.0))]);

        assert_eq!(cache.ttl(), secs(30));
        let result = cache.get_or_fetch("Dnipro", t0() + secs(31), &fetcher).await;

        assert_eq!(result, Ok(record("Dnipro", 26.0)));
    }

    #[test]
    fn test_clock_stepped_back_counts_as_fresh() {
        let entry = CacheEntry {
            record: record("Kyiv", 20.0),
            cached_at: t0(),
        };
        assert!(!entry.is_expired(t0() - secs(60), secs(CACHE_TTL_SECS)));
    }
}
