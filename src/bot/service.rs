//! Cache-backed weather lookups for handlers

use std::sync::Arc;

use chrono::Duration;

use crate::cache::{Clock, SystemClock, WeatherCache};
use crate::data::{FetchError, FetchWeather, WeatherRecord};

/// Owns the cache, the fetcher and the clock
///
/// Handlers get `&mut WeatherService`, so lookups are serialised by the
/// dispatcher and the cache needs no lock.
pub struct WeatherService {
    cache: WeatherCache,
    fetcher: Box<dyn FetchWeather>,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    /// Wall-clock service with the standard TTL
    pub fn new(fetcher: impl FetchWeather + 'static) -> Self {
        Self::with_clock(fetcher, Arc::new(SystemClock))
    }

    pub fn with_clock(fetcher: impl FetchWeather + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: WeatherCache::new(),
            fetcher: Box::new(fetcher),
            clock,
        }
    }

    /// Replace the (empty) default cache, e.g. to change the TTL
    pub fn with_cache(mut self, cache: WeatherCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Current weather for an allow-listed city, from cache when fresh
    pub async fn weather_for(&mut self, city: &str) -> Result<WeatherRecord, FetchError> {
        let now = self.clock.now();
        self.cache
            .get_or_fetch(city, now, self.fetcher.as_ref())
            .await
    }
}
