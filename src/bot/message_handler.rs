//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error};

use crate::command::{classify_text, Inbound, TextInput};
use crate::session::{SessionId, SessionStore};

use super::dialogue_manager::process_event_with_reply;
use super::ui_builder::Screen;

/// Extract the sender and routed event of a text message
///
/// Returns `None` for messages the bot does not react to: anything without
/// text or sender, and slash commands other than /start and /autochehol.
pub fn message_event(msg: &Message) -> Option<(SessionId, Inbound)> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;

    match classify_text(text) {
        TextInput::Event(event) => Some((user.id.0, event)),
        TextInput::UnknownCommand(command) => {
            debug!(user_id = %user.id, command = %command, "Ignoring unsupported command");
            None
        }
    }
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    sessions: Arc<dyn SessionStore>,
) -> Result<()> {
    let Some((session_id, event)) = message_event(&msg) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without routable text");
        return Ok(());
    };

    // Extract user's language code from Telegram
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    debug!(user_id = session_id, event = ?event, "Received text message from user");

    process_event_with_reply(
        sessions.as_ref(),
        session_id,
        language_code,
        &event,
        |screen| send_screen(&bot, msg.chat.id, session_id, screen),
    )
    .await;

    Ok(())
}

/// Text flows answer with a new message
async fn send_screen(bot: &Bot, chat_id: ChatId, session_id: SessionId, screen: Screen) {
    let mut request = bot.send_message(chat_id, screen.text);
    if let Some(keyboard) = screen.keyboard {
        request = request.reply_markup(keyboard);
    }

    if let Err(e) = request.await {
        error!(user_id = session_id, error = %e, "Failed to send reply");
    }
}
