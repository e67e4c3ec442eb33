//! Normalized incoming message.
//!
//! Flattens the teloxide [`Message`] shape into the fields the
//! classification pipeline actually cares about. Immutable once built;
//! lives for a single dispatch cycle.

use teloxide::types::{ChatId, Message, MessageId, User, UserId};

/// Message sender (or joined/left member).
#[derive(Debug, Clone)]
pub struct Sender {
    pub id: UserId,
    pub first_name: String,
    pub username: Option<String>,
    pub is_bot: bool,
}

impl Sender {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            username: user.username.clone(),
            is_bot: user.is_bot,
        }
    }
}

/// The message this one replies to, as far as moderation commands
/// need it: the id to act on and who wrote it.
#[derive(Debug, Clone)]
pub struct ReplyRef {
    pub id: MessageId,
    pub sender: Option<Sender>,
}

/// Kind of media attached to a caption-less message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Voice,
    Sticker,
    Animation,
}

impl MediaKind {
    /// Canned acknowledgment sent by the media-fallback stage.
    pub fn acknowledgment(&self) -> &'static str {
        match self {
            MediaKind::Photo => "📸 Nice photo!",
            MediaKind::Video => "🎥 Great video!",
            MediaKind::Document => "📄 Document received!",
            MediaKind::Voice => "🎤 Voice message received!",
            MediaKind::Sticker => "😄 Nice sticker!",
            MediaKind::Animation => "🎬 Cool animation!",
        }
    }
}

/// One normalized chat event consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    /// True for groups and supergroups.
    pub is_group: bool,
    pub chat_title: Option<String>,
    pub sender: Option<Sender>,
    /// Text or caption, whichever is present.
    pub text: Option<String>,
    pub media: Option<MediaKind>,
    /// The replied-to message, when this is a reply.
    pub reply_to: Option<ReplyRef>,
    /// Members that joined with this service message.
    pub joined: Vec<Sender>,
    /// Member that left with this service message.
    pub left: Option<Sender>,
}

impl IncomingMessage {
    /// Normalize a teloxide message.
    pub fn from_telegram(msg: &Message) -> Self {
        let text = msg
            .text()
            .or_else(|| msg.caption())
            .map(str::to_string);

        let media = if msg.photo().is_some() {
            Some(MediaKind::Photo)
        } else if msg.video().is_some() {
            Some(MediaKind::Video)
        } else if msg.animation().is_some() {
            // Checked before document: Telegram sends GIFs as both.
            Some(MediaKind::Animation)
        } else if msg.document().is_some() {
            Some(MediaKind::Document)
        } else if msg.voice().is_some() {
            Some(MediaKind::Voice)
        } else if msg.sticker().is_some() {
            Some(MediaKind::Sticker)
        } else {
            None
        };

        let reply_to = msg.reply_to_message().map(|reply| ReplyRef {
            id: reply.id,
            sender: reply.from.as_ref().map(Sender::from_user),
        });

        let joined = msg
            .new_chat_members()
            .map(|members| members.iter().map(Sender::from_user).collect())
            .unwrap_or_default();

        Self {
            id: msg.id,
            chat_id: msg.chat.id,
            is_group: msg.chat.is_group() || msg.chat.is_supergroup(),
            chat_title: msg.chat.title().map(str::to_string),
            sender: msg.from.as_ref().map(Sender::from_user),
            text,
            media,
            reply_to,
            joined,
            left: msg.left_chat_member().map(Sender::from_user),
        }
    }

    /// Chat title for template fillings, with a neutral fallback.
    pub fn title(&self) -> &str {
        self.chat_title.as_deref().unwrap_or("the group")
    }
}
