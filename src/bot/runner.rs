//! Long-polling loop connecting the Bot API to the dispatcher
//!
//! Updates are handled strictly one after another: each reply, including any
//! upstream weather fetch, completes before the next update is looked at.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Dispatcher, IncomingMessage};
use crate::telegram::{ReplyKeyboardMarkup, SendMessage, TelegramClient, TelegramError, Update};

/// How long `getUpdates` may wait for new messages, in seconds
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before trying again
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polls for updates until Ctrl+C or a fatal API error
///
/// Transient failures (network, 5xx, conflicts) are logged and retried after
/// [`RETRY_DELAY`]. An authentication failure ends the loop with an error.
pub async fn run_polling(
    client: &TelegramClient,
    dispatcher: &mut Dispatcher,
) -> Result<(), TelegramError> {
    let mut offset: Option<i64> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping");
                return Ok(());
            }
            polled = client.get_updates(offset, POLL_TIMEOUT_SECS) => polled,
        };

        match polled {
            Ok(updates) => {
                if let Some(next) = process_updates(client, dispatcher, &updates).await {
                    offset = Some(next);
                }
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(error = %err, "Polling failed, retrying in {}s", RETRY_DELAY.as_secs());
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

/// Handles one batch of updates and returns the offset confirming them
///
/// Returns `None` for an empty batch. A reply that fails to send is logged
/// and dropped; it does not stop the batch.
pub async fn process_updates(
    client: &TelegramClient,
    dispatcher: &mut Dispatcher,
    updates: &[Update],
) -> Option<i64> {
    let mut next_offset: Option<i64> = None;

    for update in updates {
        let confirmed = update.update_id + 1;
        next_offset = Some(next_offset.map_or(confirmed, |o| o.max(confirmed)));

        let Some(message) = incoming_message(update) else {
            debug!(update_id = update.update_id, "Skipping update without text");
            continue;
        };

        info!(chat_id = message.chat_id, "Handling message");
        let Some(reply) = dispatcher.dispatch(&message).await else {
            continue;
        };

        let body = SendMessage {
            chat_id: message.chat_id,
            text: &reply.text,
            parse_mode: reply.parse_mode.map(|mode| mode.as_str()),
            reply_markup: reply
                .keyboard
                .as_deref()
                .map(|labels| ReplyKeyboardMarkup::single_column(labels)),
        };

        if let Err(err) = client.send_message(&body).await {
            warn!(chat_id = message.chat_id, error = %err, "Failed to send reply");
        }
    }

    next_offset
}

fn incoming_message(update: &Update) -> Option<IncomingMessage> {
    let message = update.message.as_ref()?;
    let text = message.text.as_ref()?;
    Some(IncomingMessage::new(message.chat.id, text.clone()))
}
