//! Command-line interface parsing for the weather bot
//!
//! Credentials stay in the environment; the command line only controls where
//! they are loaded from, where logs go, and the description language.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Log file used when `--log-file` is not given
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Weatherbot - Telegram bot answering city names with current weather
#[derive(Parser, Debug)]
#[command(name = "weatherbot")]
#[command(about = "Telegram bot that answers city names with current weather")]
#[command(version)]
pub struct Cli {
    /// Load environment variables from this file instead of searching for .env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Append logs to this file as well as stderr
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log to stderr only
    #[arg(long, conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// Language for weather descriptions (overrides WEATHER_LANG)
    #[arg(long, value_name = "LOCALE")]
    pub lang: Option<String>,
}

impl Cli {
    /// The log file to write, if file logging is enabled
    pub fn log_path(&self) -> Option<&Path> {
        if self.no_log_file {
            None
        } else {
            Some(&self.log_file)
        }
    }
}
