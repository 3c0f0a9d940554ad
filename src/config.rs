//! Configuration loader: environment variables, optionally seeded from a .env file
//!
//! Credentials come from the environment. Everything else the bot needs
//! (city list, cache TTL, endpoints) is a compile-time constant.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Telegram bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
/// OpenWeatherMap API key
pub const WEATHER_API_KEY_VAR: &str = "API_KEY";
/// Optional language code for weather descriptions
pub const WEATHER_LANG_VAR: &str = "WEATHER_LANG";

/// Language used when `WEATHER_LANG` is unset
pub const DEFAULT_LANG: &str = "ua";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    /// An explicitly requested env file could not be read
    #[error("failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Runtime configuration
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Token used to authenticate against the Telegram Bot API
    pub telegram_token: String,
    /// OpenWeatherMap API key
    pub weather_api_key: String,
    /// Language code sent to the weather provider
    pub lang: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"<redacted>")
            .field("weather_api_key", &"<redacted>")
            .field("lang", &self.lang)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// With `env_file`, that file must exist and is loaded first. Without it, a
    /// `.env` in the current directory or a parent is loaded if present.
    /// Variables already set in the environment win over file values.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            None => {
                if let Err(e) = dotenvy::dotenv() {
                    debug!("No .env file loaded: {}", e);
                }
            }
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let telegram_token = get(TELEGRAM_TOKEN_VAR).ok_or(ConfigError::Missing(TELEGRAM_TOKEN_VAR))?;
        let weather_api_key = get(WEATHER_API_KEY_VAR).ok_or(ConfigError::Missing(WEATHER_API_KEY_VAR))?;
        let lang = get(WEATHER_LANG_VAR).unwrap_or_else(|| DEFAULT_LANG.to_string());

        Ok(Self {
            telegram_token,
            weather_api_key,
            lang,
        })
    }

    /// Replaces the language when `lang` is given
    pub fn with_lang_override(mut self, lang: Option<String>) -> Self {
        if let Some(lang) = lang.filter(|l| !l.trim().is_empty()) {
            self.lang = lang.trim().to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_all_set() {
        let config = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("API_KEY", "owm-key"),
            ("WEATHER_LANG", "en"),
        ]))
        .unwrap();

        assert_eq!(config.telegram_token, "123:abc");
        assert_eq!(config.weather_api_key, "owm-key");
        assert_eq!(config.lang, "en");
    }

    #[test]
    fn test_lang_defaults_to_ukrainian() {
        let config =
            Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t"), ("API_KEY", "k")])).unwrap();
        assert_eq!(config.lang, DEFAULT_LANG);
    }

    #[test]
    fn test_missing_token() {
        let err = Config::from_lookup(lookup(&[("API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let err =
            Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t"), ("API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));
    }

    #[test]
    fn test_lang_override() {
        let config =
            Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t"), ("API_KEY", "k")])).unwrap();

        assert_eq!(config.clone().with_lang_override(None).lang, "ua");
        assert_eq!(config.clone().with_lang_override(Some("de".into())).lang, "de");
        assert_eq!(config.with_lang_override(Some(" ".into())).lang, "ua");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:secret-token"),
            ("API_KEY", "secret-key"),
        ]))
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_load_missing_env_file_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/weatherbot.env"))).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }

    #[test]
    fn test_load_reads_env_file() {
        // Variable names unique to this test so other tests never observe them
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "WEATHERBOT_TEST_ENV_FILE_MARKER=loaded").unwrap();

        Config::load(Some(file.path())).ok();

        assert_eq!(
            std::env::var("WEATHERBOT_TEST_ENV_FILE_MARKER").as_deref(),
            Ok("loaded")
        );
    }
}
