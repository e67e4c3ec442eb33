//! /rules command.
//!
//! The rule text reflects the live moderation thresholds so a changed
//! environment variable never leaves the rules lying.

use teloxide::types::MessageId;

use crate::telegram::IncomingMessage;
use crate::utils::format_duration;

use super::CommandContext;

pub async fn run(ctx: &CommandContext, msg: &IncomingMessage) -> anyhow::Result<Vec<MessageId>> {
    let t = &ctx.thresholds;
    let text = format!(
        "📜 <b>Group rules</b>\n\
         1. Be respectful - offensive language is removed.\n\
         2. No links - only admins may post them.\n\
         3. No flooding - more than {} messages in {} gets you muted \
         for {}.",
        t.spam_limit,
        format_duration(t.spam_window.as_secs()),
        format_duration(t.mute_duration.as_secs()),
    );
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}
