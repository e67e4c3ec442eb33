//! Per-(chat, user) ordering.
//!
//! The dispatcher handles updates concurrently, but cooldown and spam
//! decisions only make sense if one sender's messages in one chat are
//! processed in arrival order. Each key owns a tokio mutex; holding it
//! for the duration of the pipeline serializes that key while leaving
//! unrelated senders fully parallel.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::{ChatId, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct KeySerializer {
    locks: DashMap<(i64, u64), Arc<Mutex<()>>>,
}

impl KeySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one sender in one chat.
    pub async fn acquire(&self, chat_id: ChatId, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry((chat_id.0, user_id.0))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop lock entries nobody currently holds or waits on.
    pub fn sweep(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
