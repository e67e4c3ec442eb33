//! /admin command - list the chat's administrators.

use teloxide::types::MessageId;

use crate::telegram::IncomingMessage;
use crate::utils::html_escape;

use super::CommandContext;

pub async fn run(ctx: &CommandContext, msg: &IncomingMessage) -> anyhow::Result<Vec<MessageId>> {
    if !msg.is_group {
        let id = ctx
            .actions
            .send_text(msg.chat_id, "This command only works in groups.", Some(msg.id))
            .await?;
        return Ok(vec![id]);
    }

    let admins = ctx.permissions.admins(msg.chat_id).await?;
    let mut lines: Vec<String> = admins
        .iter()
        .filter(|a| !a.is_bot)
        .map(|a| match &a.username {
            Some(u) => format!("• {} (@{})", html_escape(&a.first_name), html_escape(u)),
            None => format!("• {}", html_escape(&a.first_name)),
        })
        .collect();

    if lines.is_empty() {
        lines.push("(no human admins found)".to_string());
    }

    let text = format!("👮 <b>Admins</b>\n{}", lines.join("\n"));
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}
