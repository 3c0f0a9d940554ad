//! Static list of cities the bot answers for
//!
//! Only these names are ever sent to the weather provider. Matching is exact
//! and case-sensitive because the names arrive from keyboard buttons.

use thiserror::Error;

/// Supported cities, in keyboard order
pub static CITIES: [&str; 5] = ["Kyiv", "Dnipro", "Lviv", "Uzhhorod", "Berlin"];

/// The text did not name a supported city
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized city: '{0}'")]
pub struct UnrecognizedCity(pub String);

/// Get all supported cities
pub fn all_cities() -> &'static [&'static str] {
    &CITIES
}

/// Resolves user input to a supported city key.
///
/// Surrounding whitespace is ignored; everything else must match exactly.
///
/// # Returns
/// * `Ok(&'static str)` - the city key from the allow-list
/// * `Err(UnrecognizedCity)` - the trimmed input is not on the list
pub fn select_city(input: &str) -> Result<&'static str, UnrecognizedCity> {
    let trimmed = input.trim();
    CITIES
        .iter()
        .copied()
        .find(|city| *city == trimmed)
        .ok_or_else(|| UnrecognizedCity(trimmed.to_string()))
}
