//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles incoming text messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: Routes events through the conversation states

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::debug;

use crate::session::SessionStore;

pub use callback_handler::callback_handler;
pub use dialogue_manager::{process_event, process_event_with_reply, route, Lead, Transition};
pub use message_handler::message_handler;

/// Handler tree for incoming updates
///
/// Endpoints expect an `Arc<dyn SessionStore>` among the dispatcher's
/// dependencies.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

/// Dispatcher running [`schema`] with the given session store
///
/// Updates of one chat are processed one after another; other update kinds
/// are dropped with a debug log.
pub fn dispatcher(
    bot: Bot,
    sessions: Arc<dyn SessionStore>,
) -> Dispatcher<Bot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![sessions])
        .default_handler(|update: Arc<Update>| async move {
            debug!(update_id = update.id.0, "Ignoring unsupported update kind");
        })
        .build()
}
