//! Telegram Bot API transport
//!
//! Long polling and message sending over plain HTTPS. Routing of messages to
//! handlers lives in [`crate::bot`].

mod client;
pub mod types;

pub use client::{TelegramClient, TelegramError, TELEGRAM_API_URL};
pub use types::{ReplyKeyboardMarkup, SendMessage, Update};
