//! /help and /about commands.

use teloxide::types::MessageId;

use crate::telegram::IncomingMessage;
use crate::utils::html_escape;

use super::CommandContext;

const HELP_TEXT: &str = "\
<b>Commands</b>\n\
/start - Introduction\n\
/help - This list\n\
/about - About the bot\n\
/ping - Response time\n\
/id - Chat and user ids\n\
/me - Your profile info\n\
/rules - Group rules\n\
/admin - List the group admins\n\
/stats - Bot statistics\n\
/report - Report a problem to the admins\n\
\n\
<b>Admin commands</b> (reply to a message, or pass a user id)\n\
/warn - Warn a user (3 warnings = mute)\n\
/mute - Mute a user, e.g. /mute 10m\n\
/ban - Ban a user\n\
/unban - Lift a ban\n\
/kick - Remove a user without banning\n\
/pin - Pin the replied-to message\n\
/delete - Delete the replied-to message";

pub async fn run(ctx: &CommandContext, msg: &IncomingMessage) -> anyhow::Result<Vec<MessageId>> {
    let id = ctx
        .actions
        .send_text(msg.chat_id, HELP_TEXT, Some(msg.id))
        .await?;
    Ok(vec![id])
}

pub async fn about(ctx: &CommandContext, msg: &IncomingMessage) -> anyhow::Result<Vec<MessageId>> {
    let text = format!(
        "🤖 <b>{}</b> v{}\n\n\
         Group management bot: spam control, link filtering, keyword \
         auto-replies and membership greetings.",
        html_escape(&ctx.bot_name),
        env!("CARGO_PKG_VERSION"),
    );
    let id = ctx.actions.send_text(msg.chat_id, &text, Some(msg.id)).await?;
    Ok(vec![id])
}
