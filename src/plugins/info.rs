//! /id and /me commands.

use teloxide::types::MessageId;

use crate::telegram::{IncomingMessage, Sender};
use crate::utils::html_escape;

use super::CommandContext;

pub async fn id(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
) -> anyhow::Result<Vec<MessageId>> {
    let text = format!(
        "🆔 Chat id: <code>{}</code>\nYour id: <code>{}</code>",
        msg.chat_id, sender.id,
    );
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}

pub async fn me(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
) -> anyhow::Result<Vec<MessageId>> {
    let username = sender
        .username
        .as_deref()
        .map(|u| format!("@{}", html_escape(u)))
        .unwrap_or_else(|| "none".to_string());

    let text = format!(
        "👤 <b>{}</b>\nUsername: {}\nId: <code>{}</code>",
        html_escape(&sender.first_name),
        username,
        sender.id,
    );
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}
