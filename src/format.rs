//! User-facing message texts
//!
//! Pure functions only. Fetch failures are all rendered as the same static
//! text so no error detail reaches the chat.

use chrono::Duration;

use crate::data::{FetchError, WeatherRecord};

/// Sent whenever weather could not be obtained
pub const FETCH_FAILED_MESSAGE: &str = "Failed to retrieve weather data.";

/// Sent for text that is neither a command nor a supported city
pub const REJECTION_MESSAGE: &str =
    "Please select a city from the list using the buttons below, or use the /start command.";

/// Sent in reply to /start, above the city keyboard
pub const GREETING_MESSAGE: &str = "👋Hello! I'm a weather bot. Select a city from the list below to get the latest weather forecast:\n\nTry the /help command to learn more about me.";

/// Renders a weather record, or the failure text when there is none
pub fn format_weather_message(record: Option<&WeatherRecord>) -> String {
    let Some(record) = record else {
        return FETCH_FAILED_MESSAGE.to_string();
    };

    format!(
        "📍 Weather in {}:\n🌡️ Temperature: {}°C\n💧 Humidity: {}%\n☁️ Conditions: {}",
        record.city,
        record.rounded_temperature(),
        record.humidity,
        record.description
    )
}

/// Renders the outcome of a lookup
pub fn format_weather_result(result: &Result<WeatherRecord, FetchError>) -> String {
    format_weather_message(result.as_ref().ok())
}

/// Builds the Markdown help text listing `cities` and the refresh interval
pub fn help_message(cities: &[&str], ttl: Duration) -> String {
    format!(
        "📖 *Available commands:*\n\n\
         /start - Start the bot and show the city selection buttons.\n\
         /help - Show this list of commands.\n\n\
         *City selection:*\n\
         Simply choose one of the cities available on the buttons: *{}*. \
         I will show the current weather using cached data (updated every {} minutes).",
        cities.join(", "),
        ttl.num_minutes()
    )
}
