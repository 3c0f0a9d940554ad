//! Telegram Bot API client
//!
//! A thin JSON-over-HTTPS wrapper for the two methods the bot uses:
//! `getUpdates` (long polling) and `sendMessage`.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use super::types::{ApiResponse, GetUpdates, SendMessage, Update};

/// Base URL of the public Bot API
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Extra time allowed on top of the long-poll timeout before giving up on a request
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Errors returned by the Bot API client
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The request could not be sent or its body could not be read
    #[error("Telegram request failed: {0}")]
    RequestFailed(reqwest::Error),

    /// The API answered with `ok: false`
    #[error("Telegram API error {}: {description}", display_code(.code))]
    Api {
        code: Option<u16>,
        description: String,
    },

    /// The API answered with something that is not a Bot API envelope
    #[error("Unexpected Telegram response (status {status}): {detail}")]
    InvalidResponse { status: u16, detail: String },
}

fn display_code(code: &Option<u16>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string())
}

impl TelegramError {
    /// Whether retrying cannot help: the token is wrong or revoked
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TelegramError::Api {
                code: Some(401) | Some(404),
                ..
            }
        )
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the bot token
        TelegramError::RequestFailed(err.without_url())
    }
}

/// Client for the Telegram Bot API
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    /// Create a new client for the given bot token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: TELEGRAM_API_URL.to_string(),
            token: token.into(),
        }
    }

    /// Point the client at a different API server (mock servers in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Long-poll for new message updates
    ///
    /// # Arguments
    /// * `offset` - First update id to return; earlier updates are confirmed
    /// * `timeout_secs` - How long the server may hold the request open
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let request_timeout = Duration::from_secs(timeout_secs) + REQUEST_GRACE;
        self.call("getUpdates", &body, request_timeout).await
    }

    /// Send a text message
    pub async fn send_message(&self, message: &SendMessage<'_>) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.call("sendMessage", message, REQUEST_GRACE).await?;
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "Calling Telegram Bot API");

        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&text).map_err(|e| TelegramError::InvalidResponse {
                status,
                detail: e.to_string(),
            })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code.or(Some(status)),
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope.result.ok_or_else(|| TelegramError::InvalidResponse {
            status,
            detail: "missing result".to_string(),
        })
    }
}
