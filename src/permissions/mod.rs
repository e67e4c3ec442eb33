//! Admin-exemption checker with a short-TTL cache.
//!
//! The URL filter runs on every group message, so the admin list is
//! cached for 10 seconds instead of calling `getChatAdministrators`
//! each time. The staleness window is a documented behavior change
//! versus an always-fresh lookup: promotions and demotions may take up
//! to 10 seconds to affect moderation.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use teloxide::types::{ChatId, UserId};
use tracing::debug;

use crate::telegram::{AdminEntry, ChatActions};

const ADMIN_CACHE_TTL: Duration = Duration::from_secs(10);
const ADMIN_CACHE_CAPACITY: u64 = 1_000;

/// Per-chat admin list lookup.
#[derive(Clone)]
pub struct Permissions {
    actions: Arc<dyn ChatActions>,
    cache: Cache<i64, Arc<Vec<AdminEntry>>>,
}

impl Permissions {
    pub fn new(actions: Arc<dyn ChatActions>) -> Self {
        let cache = Cache::builder()
            .max_capacity(ADMIN_CACHE_CAPACITY)
            .time_to_live(ADMIN_CACHE_TTL)
            .build();
        Self { actions, cache }
    }

    /// Admin list for a chat, refreshed at most every 10 seconds.
    pub async fn admins(&self, chat_id: ChatId) -> anyhow::Result<Arc<Vec<AdminEntry>>> {
        if let Some(cached) = self.cache.get(&chat_id.0) {
            return Ok(cached);
        }

        let fresh = Arc::new(self.actions.fetch_admins(chat_id).await?);
        self.cache.insert(chat_id.0, fresh.clone());
        Ok(fresh)
    }

    /// Whether a user administers the chat.
    ///
    /// A failed lookup means "not admin" - moderation stays closed
    /// when Telegram cannot confirm the exemption.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> bool {
        match self.admins(chat_id).await {
            Ok(list) => list.iter().any(|a| a.id == user_id),
            Err(e) => {
                debug!("admin lookup failed for chat {chat_id}, assuming non-admin: {e}");
                false
            }
        }
    }

    /// Drop the cached list for a chat, forcing a fresh fetch.
    #[allow(dead_code)]
    pub fn invalidate(&self, chat_id: ChatId) {
        self.cache.invalidate(&chat_id.0);
    }
}
