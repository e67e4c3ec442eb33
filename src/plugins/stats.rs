//! /stats command and the counters behind it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use teloxide::types::MessageId;

use crate::telegram::IncomingMessage;
use crate::utils::format_duration;

use super::CommandContext;

/// Process-lifetime counters, updated with relaxed atomics.
pub struct Stats {
    pub messages: AtomicU64,
    pub commands: AtomicU64,
    pub errors: AtomicU64,
    started: Instant,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            messages: AtomicU64::new(0),
            commands: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run(ctx: &CommandContext, msg: &IncomingMessage) -> anyhow::Result<Vec<MessageId>> {
    let s = &ctx.stats;
    let text = format!(
        "📊 <b>Stats</b>\n\
         Uptime: {}\n\
         Messages seen: {}\n\
         Commands handled: {}\n\
         Errors: {}",
        format_duration(s.uptime_secs()),
        s.messages.load(Ordering::Relaxed),
        s.commands.load(Ordering::Relaxed),
        s.errors.load(Ordering::Relaxed),
    );
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}
