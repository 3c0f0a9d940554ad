//! Weatherbot Library
//!
//! Telegram bot answering city names with current weather from OpenWeatherMap,
//! cached in memory for ten minutes per city.

pub mod bot;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod format;
pub mod logging;
pub mod telegram;
