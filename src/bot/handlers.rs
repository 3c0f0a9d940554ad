//! The bot's three handlers: /start, /help and city selection

use async_trait::async_trait;
use tracing::debug;

use super::{Handler, IncomingMessage, Reply, WeatherService};
use crate::data::{all_cities, select_city};
use crate::format::{format_weather_result, help_message, GREETING_MESSAGE, REJECTION_MESSAGE};

/// `/start`: greeting plus the city keyboard
#[derive(Debug, Clone, Copy, Default)]
pub struct StartHandler;

#[async_trait]
impl Handler for StartHandler {
    fn handles(&self, message: &IncomingMessage) -> bool {
        message.command() == Some("start")
    }

    async fn handle(&self, _message: &IncomingMessage, _weather: &mut WeatherService) -> Reply {
        Reply::text(GREETING_MESSAGE).with_keyboard(all_cities())
    }
}

/// `/help`: commands and supported cities
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    fn handles(&self, message: &IncomingMessage) -> bool {
        message.command() == Some("help")
    }

    async fn handle(&self, _message: &IncomingMessage, weather: &mut WeatherService) -> Reply {
        Reply::text(help_message(all_cities(), weather.ttl())).markdown()
    }
}

/// Any other text: weather for a supported city, otherwise a prompt
///
/// Claims every message, so it belongs last in the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CityHandler;

#[async_trait]
impl Handler for CityHandler {
    fn handles(&self, _message: &IncomingMessage) -> bool {
        true
    }

    async fn handle(&self, message: &IncomingMessage, weather: &mut WeatherService) -> Reply {
        match select_city(&message.text) {
            Ok(city) => {
                let result = weather.weather_for(city).await;
                Reply::text(format_weather_result(&result))
            }
            Err(err) => {
                debug!(chat_id = message.chat_id, "{}", err);
                Reply::text(REJECTION_MESSAGE)
            }
        }
    }
}
