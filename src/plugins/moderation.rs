//! Admin moderation commands.
//!
//! /warn, /mute, /ban, /unban, /kick, /pin and /delete. All are
//! group-only, gated on the sender being an admin, and act on a target
//! named by replying to one of their messages or by a numeric user id
//! argument. Acting against another admin is refused.

use std::time::Duration;

use dashmap::DashMap;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::telegram::{IncomingMessage, Sender};
use crate::utils::{format_duration, html_escape, parse_duration};

use super::CommandContext;

/// Warnings before an automatic mute.
const WARN_LIMIT: u32 = 3;

/// In-memory warning counts per (chat, user). Like the rest of the
/// moderation state, lost on restart.
#[derive(Default)]
pub struct WarnRegistry {
    counts: DashMap<(i64, u64), u32>,
}

impl WarnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new count. The slot resets once the
    /// limit is reached so the next warning starts over.
    fn bump(&self, chat_id: ChatId, user_id: UserId) -> u32 {
        let key = (chat_id.0, user_id.0);
        let count = {
            let mut slot = self.counts.entry(key).or_insert(0);
            *slot += 1;
            *slot
        };
        if count >= WARN_LIMIT {
            self.counts.remove(&key);
        }
        count
    }
}

struct Target {
    id: UserId,
    name: String,
    /// Leading argument tokens consumed by the target reference.
    args_skipped: usize,
}

/// Target from the replied-to message, or a numeric id argument.
fn resolve_target(msg: &IncomingMessage, args: &str) -> Option<Target> {
    if let Some(reply) = &msg.reply_to {
        if let Some(sender) = &reply.sender {
            return Some(Target {
                id: sender.id,
                name: sender.first_name.clone(),
                args_skipped: 0,
            });
        }
    }

    let first = args.split_whitespace().next()?;
    let id: u64 = first.parse().ok()?;
    Some(Target {
        id: UserId(id),
        name: format!("User {id}"),
        args_skipped: 1,
    })
}

async fn refuse(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    text: &str,
) -> anyhow::Result<Vec<MessageId>> {
    let id = ctx.actions.send_text(msg.chat_id, text, Some(msg.id)).await?;
    Ok(vec![id])
}

enum Gate {
    Allowed(Target),
    Refused(Vec<MessageId>),
}

/// Shared admission check: group-only, sender must be admin, target
/// must resolve and must not be an admin.
async fn gate(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Gate> {
    if !msg.is_group {
        return Ok(Gate::Refused(
            refuse(ctx, msg, "⚠️ This command only works in groups.").await?,
        ));
    }
    if !ctx.permissions.is_admin(msg.chat_id, sender.id).await {
        return Ok(Gate::Refused(
            refuse(ctx, msg, "❌ This command is for admins.").await?,
        ));
    }
    let Some(target) = resolve_target(msg, args) else {
        return Ok(Gate::Refused(
            refuse(ctx, msg, "❌ Reply to the user's message, or give a user id.").await?,
        ));
    };
    if ctx.permissions.is_admin(msg.chat_id, target.id).await {
        return Ok(Gate::Refused(
            refuse(ctx, msg, "😏 I'd rather not act against an admin.").await?,
        ));
    }
    Ok(Gate::Allowed(target))
}

fn reason_from(args: &str, skip: usize) -> Option<String> {
    let reason = args
        .split_whitespace()
        .skip(skip)
        .collect::<Vec<_>>()
        .join(" ");
    (!reason.is_empty()).then(|| html_escape(&reason))
}

pub async fn warn(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    let target = match gate(ctx, msg, sender, args).await? {
        Gate::Allowed(t) => t,
        Gate::Refused(ids) => return Ok(ids),
    };

    let count = ctx.warns.bump(msg.chat_id, target.id);
    let text = if count >= WARN_LIMIT {
        ctx.actions
            .restrict_member(msg.chat_id, target.id, ctx.thresholds.mute_duration)
            .await?;
        format!(
            "🔇 <b>{}</b> reached {WARN_LIMIT} warnings and has been muted for {}.",
            html_escape(&target.name),
            format_duration(ctx.thresholds.mute_duration.as_secs()),
        )
    } else {
        let mut text = format!(
            "⚠️ <b>{}</b> warned ({count}/{WARN_LIMIT}).",
            html_escape(&target.name)
        );
        if let Some(reason) = reason_from(args, target.args_skipped) {
            text.push_str(&format!("\nReason: {reason}"));
        }
        text
    };

    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}

pub async fn mute(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    let target = match gate(ctx, msg, sender, args).await? {
        Gate::Allowed(t) => t,
        Gate::Refused(ids) => return Ok(ids),
    };

    // Optional duration argument right after the target, e.g. /mute 10m.
    let duration: Duration = args
        .split_whitespace()
        .nth(target.args_skipped)
        .and_then(parse_duration)
        .unwrap_or(ctx.thresholds.mute_duration);

    ctx.actions
        .restrict_member(msg.chat_id, target.id, duration)
        .await?;

    let text = format!(
        "🔇 <b>{}</b> muted for {}.",
        html_escape(&target.name),
        format_duration(duration.as_secs()),
    );
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}

pub async fn ban(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    let target = match gate(ctx, msg, sender, args).await? {
        Gate::Allowed(t) => t,
        Gate::Refused(ids) => return Ok(ids),
    };

    ctx.actions.ban_member(msg.chat_id, target.id).await?;

    let mut text = format!("🚫 <b>{}</b> has been banned.", html_escape(&target.name));
    if let Some(reason) = reason_from(args, target.args_skipped) {
        text.push_str(&format!("\nReason: {reason}"));
    }
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}

pub async fn unban(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    // No anti-admin check: unban only restores access.
    if !msg.is_group {
        return refuse(ctx, msg, "⚠️ This command only works in groups.").await;
    }
    if !ctx.permissions.is_admin(msg.chat_id, sender.id).await {
        return refuse(ctx, msg, "❌ This command is for admins.").await;
    }
    let Some(target) = resolve_target(msg, args) else {
        return refuse(ctx, msg, "❌ Reply to the user's message, or give a user id.").await;
    };

    ctx.actions.unban_member(msg.chat_id, target.id).await?;

    let text = format!("✅ <b>{}</b> has been unbanned.", html_escape(&target.name));
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}

/// Ban then unban: removes the member without a lasting ban.
pub async fn kick(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    let target = match gate(ctx, msg, sender, args).await? {
        Gate::Allowed(t) => t,
        Gate::Refused(ids) => return Ok(ids),
    };

    ctx.actions.ban_member(msg.chat_id, target.id).await?;
    ctx.actions.unban_member(msg.chat_id, target.id).await?;

    let text = format!("👢 <b>{}</b> has been kicked.", html_escape(&target.name));
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}

pub async fn pin(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
) -> anyhow::Result<Vec<MessageId>> {
    if !msg.is_group {
        return refuse(ctx, msg, "⚠️ This command only works in groups.").await;
    }
    if !ctx.permissions.is_admin(msg.chat_id, sender.id).await {
        return refuse(ctx, msg, "❌ This command is for admins.").await;
    }
    let Some(reply) = &msg.reply_to else {
        return refuse(ctx, msg, "❌ Reply to the message you want pinned.").await;
    };

    ctx.actions.pin_message(msg.chat_id, reply.id).await?;

    let id = ctx
        .actions
        .send_text(msg.chat_id, "📌 Pinned.", Some(reply.id))
        .await?;
    Ok(vec![id])
}

/// Delete the replied-to message along with the command itself.
pub async fn delete(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
) -> anyhow::Result<Vec<MessageId>> {
    if !msg.is_group {
        return refuse(ctx, msg, "⚠️ This command only works in groups.").await;
    }
    if !ctx.permissions.is_admin(msg.chat_id, sender.id).await {
        return refuse(ctx, msg, "❌ This command is for admins.").await;
    }
    let Some(reply) = &msg.reply_to else {
        return refuse(ctx, msg, "❌ Reply to the message you want deleted.").await;
    };

    ctx.actions.delete_message(msg.chat_id, reply.id).await?;
    ctx.actions.delete_message(msg.chat_id, msg.id).await?;
    Ok(vec![])
}
