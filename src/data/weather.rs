//! OpenWeatherMap current-weather client
//!
//! This module fetches current conditions for a city from the OpenWeatherMap
//! API and parses the response into a [`WeatherRecord`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::WeatherRecord;

/// Current-weather endpoint of the OpenWeatherMap API
pub const OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// City name used when the provider omits one
const UNKNOWN_CITY: &str = "Unknown";

/// Errors that can occur when fetching weather data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The provider answered with a non-200 status
    #[error("Weather API returned status {0}")]
    ApiError(u16),

    /// The request never produced a response (DNS, refused, timeout)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The response body was not the expected JSON shape
    #[error("Failed to parse weather response: {0}")]
    ParseError(String),
}

/// Something that can look up the current weather for a city
///
/// [`WeatherClient`] talks to the real provider; tests substitute fakes.
#[async_trait]
pub trait FetchWeather: Send + Sync {
    /// Fetch current weather for `city`. Makes exactly one attempt.
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, FetchError>;
}

#[async_trait]
impl<T: FetchWeather + ?Sized> FetchWeather for Arc<T> {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        (**self).fetch(city).await
    }
}

/// Client for fetching weather data from the OpenWeatherMap API
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    lang: String,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("lang", &self.lang)
            .finish()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient for the given API key and response language
    pub fn new(api_key: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: OPENWEATHERMAP_URL.to_string(),
            api_key: api_key.into(),
            lang: lang.into(),
        }
    }

    /// Point the client at a different endpoint (mock servers in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Language code sent with every request
    pub fn lang(&self) -> &str {
        &self.lang
    }
}

#[async_trait]
impl FetchWeather for WeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherRecord, FetchError> {
        debug!(city, url = %self.base_url, lang = %self.lang, "Requesting current weather");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(connection_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::ApiError(status.as_u16()));
        }

        let text = response.text().await.map_err(connection_error)?;
        parse_response(&text)
    }
}

/// Convert a transport error, dropping the URL so the API key never ends up in logs
fn connection_error(err: reqwest::Error) -> FetchError {
    FetchError::ConnectionError(err.without_url().to_string())
}

/// Parse an OpenWeatherMap response body into a WeatherRecord
pub fn parse_response(body: &str) -> Result<WeatherRecord, FetchError> {
    let response: OpenWeatherResponse =
        serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))?;

    let main = response
        .main
        .ok_or_else(|| missing_field("main"))?;
    let temperature = main.temp.ok_or_else(|| missing_field("main.temp"))?;
    let humidity = main.humidity.ok_or_else(|| missing_field("main.humidity"))?;

    if !(0.0..=100.0).contains(&humidity) {
        return Err(FetchError::ParseError(format!(
            "humidity out of range: {}",
            humidity
        )));
    }

    let description = response
        .weather
        .into_iter()
        .next()
        .and_then(|condition| condition.description)
        .ok_or_else(|| missing_field("weather[0].description"))?;

    Ok(WeatherRecord {
        city: response.name.unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        temperature,
        humidity: humidity.round() as u8,
        description: capitalize(&description),
    })
}

fn missing_field(field: &str) -> FetchError {
    FetchError::ParseError(format!("missing field {}", field))
}

/// Upper-case the first character and lower-case the rest
///
/// Works on Unicode scalars, so Cyrillic descriptions ("хмарно") come out right.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// OpenWeatherMap API response structure
///
/// Fields are optional so that a missing field becomes a `ParseError`
/// naming the field instead of a generic serde message.
#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    name: Option<String>,
    main: Option<MainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

/// Temperature and humidity block
#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

/// One entry of the `weather` array
#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
}
