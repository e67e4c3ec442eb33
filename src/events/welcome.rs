//! Membership greetings.
//!
//! Service messages about joins and leaves are turned into greeting
//! texts here; actually sending them (and fetching the admin list for
//! the bot's own introduction) stays with the pipeline. Keeping this
//! stage pure makes the template selection testable without mocks.

use teloxide::types::UserId;

use crate::tables::WelcomeTemplates;
use crate::telegram::{AdminEntry, IncomingMessage};
use crate::utils::{apply_member_fillings, html_escape};

use super::support::ReplySelector;

/// One greeting to send for a membership event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Greeting {
    /// The bot itself was added; the pipeline fetches the admin list
    /// and composes the introduction.
    Introduction,
    /// Ready-to-send welcome or goodbye text.
    Text(String),
}

pub struct Greeter {
    templates: WelcomeTemplates,
    bot_id: UserId,
    bot_name: String,
}

impl Greeter {
    pub fn new(templates: WelcomeTemplates, bot_id: UserId, bot_name: String) -> Self {
        Self {
            templates,
            bot_id,
            bot_name,
        }
    }

    /// Whether this service message announces the bot's own join.
    pub fn is_self_join(&self, msg: &IncomingMessage) -> bool {
        msg.joined.iter().any(|member| member.id == self.bot_id)
    }

    /// Greetings for a service message, in member order. An empty
    /// template list disables the corresponding greeting; other bots
    /// joining are ignored.
    pub fn greetings(&self, msg: &IncomingMessage, selector: &dyn ReplySelector) -> Vec<Greeting> {
        let mut out = Vec::new();

        for member in &msg.joined {
            if member.id == self.bot_id {
                out.push(Greeting::Introduction);
            } else if !member.is_bot && !self.templates.group.is_empty() {
                let template = &self.templates.group[selector.pick(self.templates.group.len())];
                out.push(Greeting::Text(apply_member_fillings(
                    template,
                    member,
                    msg.title(),
                )));
            }
        }

        if let Some(member) = &msg.left {
            if member.id != self.bot_id && !member.is_bot && !self.templates.goodbye.is_empty() {
                let template =
                    &self.templates.goodbye[selector.pick(self.templates.goodbye.len())];
                out.push(Greeting::Text(apply_member_fillings(
                    template,
                    member,
                    msg.title(),
                )));
            }
        }

        out
    }

    /// Introduction sent when the bot is added to a group, mentioning
    /// the human admins so members know who to ask for setup.
    pub fn introduction(&self, chat_title: &str, admins: &[AdminEntry]) -> String {
        let mut text = format!(
            "🤖 Hello <b>{}</b>! I'm {}.\n\
             I keep the chat tidy: spam control, link filtering and \
             auto-replies. Send /help to see what I can do.",
            html_escape(chat_title),
            html_escape(&self.bot_name),
        );

        let mentions: Vec<String> = admins
            .iter()
            .filter(|a| !a.is_bot)
            .map(|a| match &a.username {
                Some(u) => format!("@{}", html_escape(u)),
                None => html_escape(&a.first_name),
            })
            .collect();

        if !mentions.is_empty() {
            text.push_str("\n\nAdmins: ");
            text.push_str(&mentions.join(", "));
        }

        text
    }
}
