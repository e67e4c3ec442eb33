//! Command handlers.
//!
//! Add new commands by:
//! 1. Creating a new file in this directory
//! 2. Adding the variant to [`Command`] and its name to `NAMES`
//! 3. Adding the handler arm to [`handle`]
//!
//! Commands are parsed by hand instead of a dptree filter so the
//! pipeline can run its cooldown stage first and so `/cmd@OtherBot`
//! can be ignored without a round-trip through the dispatcher.

pub mod admin;
pub mod help;
pub mod info;
pub mod moderation;
pub mod ping;
pub mod report;
pub mod rules;
pub mod start;
pub mod stats;

use std::sync::Arc;

use teloxide::types::MessageId;

use crate::config::Thresholds;
use crate::events::support::ReplySelector;
use crate::permissions::Permissions;
use crate::tables::WelcomeTemplates;
use crate::telegram::{ChatActions, IncomingMessage, Sender};

pub use moderation::WarnRegistry;
pub use stats::Stats;

/// All bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    About,
    Ping,
    Id,
    Me,
    Rules,
    Admin,
    Stats,
    Report,
    // Admin-only moderation
    Warn,
    Mute,
    Ban,
    Unban,
    Kick,
    Pin,
    Delete,
}

/// Command names in /help order, without the leading slash.
pub const NAMES: [&str; 17] = [
    "start", "help", "about", "ping", "id", "me", "rules", "admin", "stats", "report", "warn",
    "mute", "ban", "unban", "kick", "pin", "delete",
];

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "start" => Self::Start,
            "help" => Self::Help,
            "about" => Self::About,
            "ping" => Self::Ping,
            "id" => Self::Id,
            "me" => Self::Me,
            "rules" => Self::Rules,
            "admin" => Self::Admin,
            "stats" => Self::Stats,
            "report" => Self::Report,
            "warn" => Self::Warn,
            "mute" => Self::Mute,
            "ban" => Self::Ban,
            "unban" => Self::Unban,
            "kick" => Self::Kick,
            "pin" => Self::Pin,
            "delete" => Self::Delete,
            _ => return None,
        })
    }
}

/// Result of parsing a message's first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<'a> {
    Known(Command, &'a str),
    /// A slash command we do not recognize (name without slash).
    Unknown(&'a str),
    /// `/cmd@SomeOtherBot` - addressed to a different bot.
    Foreign,
}

/// Parse a slash command from message text.
///
/// Returns `None` for ordinary text. A `@username` suffix must match
/// our own username (case-insensitive) or the command is `Foreign`;
/// when our username is still unknown any addressed command is treated
/// as foreign rather than risk answering another bot's traffic.
pub fn parse<'a>(text: &'a str, bot_username: Option<&str>) -> Option<Parsed<'a>> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('/') {
        return None;
    }

    let token = trimmed.split_whitespace().next().unwrap_or(trimmed);
    let args = trimmed[token.len()..].trim();
    let name = &token[1..];
    if name.is_empty() {
        return None;
    }

    let (name, target) = match name.split_once('@') {
        Some((n, t)) => (n, Some(t)),
        None => (name, None),
    };

    if let Some(target) = target {
        match bot_username {
            Some(me) if target.eq_ignore_ascii_case(me) => {}
            _ => return Some(Parsed::Foreign),
        }
    }

    let lowered = name.to_lowercase();
    match Command::from_name(&lowered) {
        Some(cmd) => Some(Parsed::Known(cmd, args)),
        None => Some(Parsed::Unknown(name)),
    }
}

/// Hint sent for an unrecognized slash command.
pub fn unknown_command(name: &str) -> String {
    let lowered = name.to_lowercase();
    let suggestion = NAMES
        .iter()
        .find(|known| known.contains(lowered.as_str()) || lowered.contains(**known));

    match suggestion {
        Some(known) => format!("🤔 Unknown command /{name}. Did you mean /{known}?"),
        None => format!("🤔 Unknown command /{name}. Send /help for the list."),
    }
}

/// Shared state for command handlers.
#[derive(Clone)]
pub struct CommandContext {
    pub actions: Arc<dyn ChatActions>,
    pub permissions: Permissions,
    pub stats: Arc<Stats>,
    pub selector: Arc<dyn ReplySelector>,
    pub welcome: WelcomeTemplates,
    pub warns: Arc<WarnRegistry>,
    pub bot_name: String,
    pub thresholds: Thresholds,
}

/// Dispatch a recognized command. Returns the ids of sent messages so
/// the caller can account for them in the per-chat history.
pub async fn handle(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    cmd: Command,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    match cmd {
        Command::Start => start::run(ctx, msg, sender).await,
        Command::Help => help::run(ctx, msg).await,
        Command::About => help::about(ctx, msg).await,
        Command::Ping => ping::run(ctx, msg).await,
        Command::Id => info::id(ctx, msg, sender).await,
        Command::Me => info::me(ctx, msg, sender).await,
        Command::Rules => rules::run(ctx, msg).await,
        Command::Admin => admin::run(ctx, msg).await,
        Command::Stats => stats::run(ctx, msg).await,
        Command::Report => report::run(ctx, msg, sender, args).await,
        Command::Warn => moderation::warn(ctx, msg, sender, args).await,
        Command::Mute => moderation::mute(ctx, msg, sender, args).await,
        Command::Ban => moderation::ban(ctx, msg, sender, args).await,
        Command::Unban => moderation::unban(ctx, msg, sender, args).await,
        Command::Kick => moderation::kick(ctx, msg, sender, args).await,
        Command::Pin => moderation::pin(ctx, msg, sender).await,
        Command::Delete => moderation::delete(ctx, msg, sender).await,
    }
}
