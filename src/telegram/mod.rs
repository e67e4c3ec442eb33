//! Telegram adapter layer.
//!
//! The only place that interprets platform event shapes or issues
//! outbound API calls. The pipeline consumes the normalized
//! [`message::IncomingMessage`] and talks back through the
//! [`actions::ChatActions`] trait, so everything above this layer can
//! run against mocks.

pub mod actions;
pub mod message;

pub use actions::{AdminEntry, ChatActions, TelegramActions};
pub use message::{IncomingMessage, MediaKind, ReplyRef, Sender};
