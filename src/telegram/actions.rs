//! Outbound chat actions.
//!
//! Everything the bot does *to* a chat goes through [`ChatActions`]:
//! sending text, deleting messages, restricting members, fetching the
//! admin list and showing the typing indicator. The pipeline treats
//! these as fire-and-forget collaborators whose failures are logged
//! and never fatal; tests substitute a recording mock.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, ChatPermissions, MessageId, ParseMode, ReplyParameters, UserId};

use crate::bot::dispatcher::ThrottledBot;

/// One entry of a chat's administrator list.
#[derive(Debug, Clone)]
pub struct AdminEntry {
    pub id: UserId,
    pub first_name: String,
    pub username: Option<String>,
    pub is_bot: bool,
}

/// Outbound side effects requested by the pipeline.
#[async_trait]
pub trait ChatActions: Send + Sync {
    /// Send an HTML-formatted text message, optionally as a reply.
    /// Returns the id of the sent message.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> anyhow::Result<MessageId>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()>;

    /// Mute a member for `duration` (no send permissions).
    async fn restrict_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration: Duration,
    ) -> anyhow::Result<()>;

    /// Permanently ban a member from the chat.
    async fn ban_member(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<()>;

    /// Lift a ban. Ban followed by unban works as a kick.
    async fn unban_member(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<()>;

    /// Pin a message, without the notification blast.
    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()>;

    async fn fetch_admins(&self, chat_id: ChatId) -> anyhow::Result<Vec<AdminEntry>>;

    /// Show the "typing..." indicator.
    async fn typing(&self, chat_id: ChatId) -> anyhow::Result<()>;
}

/// Production implementation over the throttled teloxide bot.
pub struct TelegramActions {
    bot: ThrottledBot,
}

impl TelegramActions {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatActions for TelegramActions {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> anyhow::Result<MessageId> {
        let mut req = self.bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
        if let Some(id) = reply_to {
            req = req.reply_parameters(ReplyParameters::new(id));
        }
        let sent = req.await?;
        Ok(sent.id)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        duration: Duration,
    ) -> anyhow::Result<()> {
        let until = chrono::Utc::now() + chrono::Duration::from_std(duration)?;

        // No permissions = muted
        self.bot
            .restrict_chat_member(chat_id, user_id, ChatPermissions::empty())
            .until_date(until)
            .await?;
        Ok(())
    }

    async fn ban_member(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<()> {
        self.bot.ban_chat_member(chat_id, user_id).await?;
        Ok(())
    }

    async fn unban_member(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<()> {
        self.bot.unban_chat_member(chat_id, user_id).await?;
        Ok(())
    }

    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()> {
        self.bot
            .pin_chat_message(chat_id, message_id)
            .disable_notification(true)
            .await?;
        Ok(())
    }

    async fn fetch_admins(&self, chat_id: ChatId) -> anyhow::Result<Vec<AdminEntry>> {
        let members = self.bot.get_chat_administrators(chat_id).await?;
        Ok(members
            .iter()
            .map(|m| AdminEntry {
                id: m.user.id,
                first_name: m.user.first_name.clone(),
                username: m.user.username.clone(),
                is_bot: m.user.is_bot,
            })
            .collect())
    }

    async fn typing(&self, chat_id: ChatId) -> anyhow::Result<()> {
        self.bot.send_chat_action(chat_id, ChatAction::Typing).await?;
        Ok(())
    }
}
