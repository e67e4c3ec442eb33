//! Bounded log of bot-sent message ids.
//!
//! Each chat keeps the ids of the last ten messages the bot sent
//! there. Pushing an eleventh id evicts the oldest, which the pipeline
//! then deletes from the chat on a best-effort basis so the bot never
//! accumulates more than ten of its own messages per chat.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use teloxide::types::{ChatId, MessageId};

pub struct SentLog {
    chats: Mutex<HashMap<i64, VecDeque<MessageId>>>,
    capacity: usize,
}

impl SentLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            chats: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Record a sent message; returns the evicted oldest id when the
    /// chat's log was already full.
    pub fn push(&self, chat_id: ChatId, message_id: MessageId) -> Option<MessageId> {
        let mut chats = self.chats.lock();
        let queue = chats.entry(chat_id.0).or_default();
        queue.push_back(message_id);
        if queue.len() > self.capacity {
            queue.pop_front()
        } else {
            None
        }
    }

    #[cfg(test)]
    fn tracked(&self, chat_id: ChatId) -> usize {
        self.chats
            .lock()
            .get(&chat_id.0)
            .map_or(0, VecDeque::len)
    }
}
