//! Weatherbot - Telegram bot answering city names with current weather
//!
//! Loads credentials, then long-polls the Bot API until Ctrl+C. Any error that
//! ends the polling loop is logged as critical and the process exits.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use weatherbot::bot::{run_polling, Dispatcher, WeatherService};
use weatherbot::cli::Cli;
use weatherbot::config::Config;
use weatherbot::data::WeatherClient;
use weatherbot::logging;
use weatherbot::telegram::TelegramClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_path()) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.env_file.as_deref()) {
        Ok(config) => config.with_lang_override(cli.lang.clone()),
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let weather_client = WeatherClient::new(&config.weather_api_key, &config.lang);
    let mut dispatcher = Dispatcher::with_default_handlers(WeatherService::new(weather_client));
    let telegram = TelegramClient::new(&config.telegram_token);

    info!(lang = %config.lang, "Bot is running. Press Ctrl+C to stop.");

    match run_polling(&telegram, &mut dispatcher).await {
        Ok(()) => {
            info!("Bot stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Critical error while running the bot: {}", e);
            ExitCode::FAILURE
        }
    }
}
