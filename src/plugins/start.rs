//! /start command.

use teloxide::types::MessageId;

use crate::telegram::{IncomingMessage, Sender};
use crate::utils::{apply_member_fillings, html_escape};

use super::CommandContext;

/// Greet the user. In private chats a configured welcome template is
/// used when one exists; groups get a short capability blurb.
pub async fn run(
    ctx: &CommandContext,
    msg: &IncomingMessage,
    sender: &Sender,
) -> anyhow::Result<Vec<MessageId>> {
    let text = if !msg.is_group && !ctx.welcome.private.is_empty() {
        let template = &ctx.welcome.private[ctx.selector.pick(ctx.welcome.private.len())];
        apply_member_fillings(template, sender, msg.title())
    } else {
        format!(
            "👋 Hello! I'm <b>{}</b>.\n\n\
             I keep groups tidy: spam control, link filtering, keyword \
             auto-replies and welcome messages.\n\n\
             Send /help for the command list.",
            html_escape(&ctx.bot_name)
        )
    };

    let id = ctx.actions.send_text(msg.chat_id, &text, None).await?;
    Ok(vec![id])
}
