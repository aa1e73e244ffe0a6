//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, warn};

use crate::command::{Command, CommandError, Inbound};
use crate::session::SessionStore;

use super::dialogue_manager::process_event_with_reply;
use super::ui_builder::Screen;

/// Decode the callback token carried by the pressed button
pub fn callback_command(q: &CallbackQuery) -> Result<Command, CommandError> {
    q.data.as_deref().unwrap_or("").parse()
}

/// Handle callback queries from inline keyboards
///
/// The new screen replaces the message that carried the button. The query
/// is answered in every case, also when the button was not handled.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    sessions: Arc<dyn SessionStore>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    match callback_command(&q) {
        Ok(command) => {
            process_event_with_reply(
                sessions.as_ref(),
                q.from.id.0,
                q.from.language_code.as_deref(),
                &Inbound::Button(command),
                |screen| edit_screen(&bot, &q, screen),
            )
            .await;
        }
        Err(e) => {
            debug!(user_id = %q.from.id, error = %e, "Ignoring callback token");
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}

/// Edit the message behind the button; a screen without keyboard removes it
async fn edit_screen(bot: &Bot, q: &CallbackQuery, screen: Screen) {
    let Some(msg) = &q.message else {
        warn!(user_id = %q.from.id, "Callback query without message, cannot show screen");
        return;
    };

    let mut request = bot.edit_message_text(msg.chat().id, msg.id(), screen.text);
    if let Some(keyboard) = screen.keyboard {
        request = request.reply_markup(keyboard);
    }

    match request.await {
        Ok(_) => (),
        Err(RequestError::Api(ApiError::MessageNotModified)) => {
            debug!(user_id = %q.from.id, "Screen unchanged, nothing to edit")
        }
        Err(e) => {
            error!(user_id = %q.from.id, error = %e, "Failed to edit message for callback")
        }
    }
}
