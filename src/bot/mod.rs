//! Message routing
//!
//! Incoming text messages go through an ordered table of [`Handler`]s; the
//! first handler that claims a message produces the reply. The table is built
//! once at startup, so adding a command means registering one more handler.

mod handlers;
mod runner;
mod service;

pub use handlers::{CityHandler, HelpHandler, StartHandler};
pub use runner::{process_updates, run_polling, POLL_TIMEOUT_SECS, RETRY_DELAY};
pub use service::WeatherService;

use async_trait::async_trait;

/// A text message received from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }

    /// The command name if the message is a slash command
    ///
    /// `/start`, `/start@my_bot` and `/start now` all yield `"start"`.
    pub fn command(&self) -> Option<&str> {
        let first = self.text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Markup dialect of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// The answer to one incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    /// Button labels to show under the input field, one per row
    pub keyboard: Option<Vec<String>>,
}

impl Reply {
    /// Plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            keyboard: None,
        }
    }

    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Markdown);
        self
    }

    pub fn with_keyboard<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        self.keyboard = Some(labels.iter().map(|l| l.as_ref().to_string()).collect());
        self
    }
}

/// One entry of the dispatch table
#[async_trait]
pub trait Handler: Send + Sync {
    /// Whether this handler answers `message`
    fn handles(&self, message: &IncomingMessage) -> bool;

    /// Produce the reply. Only called when `handles` returned true.
    async fn handle(&self, message: &IncomingMessage, weather: &mut WeatherService) -> Reply;
}

/// Routes messages to the first matching handler
pub struct Dispatcher {
    handlers: Vec<Box<dyn Handler>>,
    weather: WeatherService,
}

impl Dispatcher {
    /// An empty table; nothing is answered until handlers are registered
    pub fn new(weather: WeatherService) -> Self {
        Self {
            handlers: Vec::new(),
            weather,
        }
    }

    /// `/start`, `/help`, then city selection for everything else
    pub fn with_default_handlers(weather: WeatherService) -> Self {
        Self::new(weather)
            .register(StartHandler)
            .register(HelpHandler)
            .register(CityHandler)
    }

    /// Appends `handler`; earlier registrations take precedence
    pub fn register(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn weather(&self) -> &WeatherService {
        &self.weather
    }

    /// Runs the first handler that claims `message`
    ///
    /// Returns `None` when no handler does.
    pub async fn dispatch(&mut self, message: &IncomingMessage) -> Option<Reply> {
        for handler in &self.handlers {
            if handler.handles(message) {
                return Some(handler.handle(message, &mut self.weather).await);
            }
        }
        None
    }
}
