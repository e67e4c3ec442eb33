//! Message dispatcher setup.
//!
//! Wires the teloxide dispatcher to the classification pipeline. The
//! dispatcher fans updates out concurrently; per-sender ordering is
//! the pipeline's own responsibility.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::UserId;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::events::{Greeter, Pipeline, PipelineSeams};
use crate::permissions::Permissions;
use crate::plugins::{CommandContext, Stats, WarnRegistry};
use crate::tables::{BadWordSet, ReplyTable, WelcomeTemplates};
use crate::telegram::{ChatActions, IncomingMessage, TelegramActions};

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub stats: Arc<Stats>,
}

impl AppState {
    /// Wire up the pipeline from config and the data-dir tables.
    pub fn new(bot: ThrottledBot, config: &Config, bot_id: UserId, bot_username: Option<String>) -> Self {
        let actions: Arc<dyn ChatActions> = Arc::new(TelegramActions::new(bot));
        let permissions = Permissions::new(actions.clone());
        let stats = Arc::new(Stats::new());
        let seams = PipelineSeams::default();

        let replies = ReplyTable::load(&config.data_dir.join("replies.json"));
        let bad_words = BadWordSet::load(&config.data_dir.join("badwords.json"));
        let templates = WelcomeTemplates::load(&config.data_dir.join("welcome.json"));
        info!(
            "tables loaded: {} reply patterns, {} bad words, {} welcome templates",
            replies.len(),
            bad_words.len(),
            templates.group.len(),
        );

        let commands = CommandContext {
            actions: actions.clone(),
            permissions: permissions.clone(),
            stats: stats.clone(),
            selector: seams.selector.clone(),
            welcome: templates.clone(),
            warns: Arc::new(WarnRegistry::new()),
            bot_name: config.bot_name.clone(),
            thresholds: config.thresholds.clone(),
        };
        let greeter = Greeter::new(templates, bot_id, config.bot_name.clone());

        let pipeline = Pipeline::new(
            actions,
            permissions,
            commands,
            replies,
            bad_words,
            greeter,
            &config.thresholds,
            config.blocked_users.iter().copied().collect(),
            bot_username,
            seams,
        );

        Self {
            pipeline: Arc::new(pipeline),
            stats,
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_edited_message().endpoint(handle_edited_message))
}

async fn handle_message(msg: Message, state: AppState) -> anyhow::Result<()> {
    state.stats.messages.fetch_add(1, Ordering::Relaxed);

    let incoming = IncomingMessage::from_telegram(&msg);
    let chat_id = incoming.chat_id;

    match state.pipeline.process(&incoming).await {
        Ok(outcome) => {
            debug!("message {} in {chat_id}: {outcome:?}", incoming.id.0);
        }
        Err(e) => {
            state.stats.errors.fetch_add(1, Ordering::Relaxed);
            error!("failed to process message {} in {chat_id}: {e:#}", incoming.id.0);
            state.pipeline.notify_failure(chat_id).await;
        }
    }

    Ok(())
}

/// Edits are acknowledged but never moderated or answered.
async fn handle_edited_message(msg: Message) -> anyhow::Result<()> {
    debug!("ignoring edit of message {} in {}", msg.id.0, msg.chat.id);
    Ok(())
}
