//! Core data models for the weather bot
//!
//! This module contains the weather record produced by the provider client,
//! the static list of supported cities, and the provider client itself.

pub mod cities;
pub mod weather;

pub use cities::{all_cities, select_city, UnrecognizedCity, CITIES};
pub use weather::{FetchError, FetchWeather, WeatherClient};

use serde::{Deserialize, Serialize};

/// Current weather conditions for one city
///
/// Built only by parsing a provider response, so every field has already been
/// validated: humidity is within 0-100 and the description is capitalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// City name as reported by the provider
    pub city: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Condition text, e.g. "Clear sky"
    pub description: String,
}

impl WeatherRecord {
    /// Temperature rounded to the nearest whole degree, halves away from zero
    pub fn rounded_temperature(&self) -> i64 {
        self.temperature.round() as i64
    }
}
