//! /report command - ping the admins.

use teloxide::types::MessageId;

use crate::telegram::{IncomingMessage, Sender};
use crate::utils::html_escape;

use super::CommandContext;

pub async fn run(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
    args: &str,
) -> anyhow::Result<Vec<MessageId>> {
    if !msg.is_group {
        let id = ctx
            .actions
            .send_text(msg.chat_id, "Reports only work in groups.", Some(msg.id))
            .await?;
        return Ok(vec![id]);
    }

    let admins = ctx.permissions.admins(msg.chat_id).await?;
    let mentions: Vec<String> = admins
        .iter()
        .filter(|a| !a.is_bot)
        .map(|a| match &a.username {
            Some(u) => format!("@{}", html_escape(u)),
            None => html_escape(&a.first_name),
        })
        .collect();

    let mut text = format!("🚨 <b>{}</b> reported a problem.", html_escape(&sender.first_name));
    if !args.is_empty() {
        text.push_str(&format!("\nReason: {}", html_escape(args)));
    }
    if !mentions.is_empty() {
        text.push_str(&format!("\n{}", mentions.join(" ")));
    }

    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}
