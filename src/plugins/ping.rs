//! /ping command.
//!
//! Round-trip latency measured as the time the first send takes.

use std::time::Instant;

use teloxide::types::MessageId;

use crate::telegram::IncomingMessage;

use super::CommandContext;

pub async fn run(ctx: &CommandContext, msg: &IncomingMessage) -> anyhow::Result<Vec<MessageId>> {
    let start = Instant::now();
    let first = ctx
        .actions
        .send_text(msg.chat_id, "🏓 Pinging...", Some(msg.id))
        .await?;
    let ms = start.elapsed().as_millis();

    let emoji = if ms < 100 {
        "🟢"
    } else if ms < 300 {
        "🟡"
    } else {
        "🔴"
    };

    let second = ctx
        .actions
        .send_text(msg.chat_id, &format!("{emoji} Pong! <code>{ms}ms</code>"), None)
        .await?;

    Ok(vec![first, second])
}
