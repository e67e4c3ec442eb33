//! Per-user message cooldown.
//!
//! Debounces rapid-fire messages: a message arriving within the
//! cooldown interval of the previously *processed* one from the same
//! (chat, user) is dropped silently before classification.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use teloxide::types::{ChatId, UserId};

/// Retention horizon for idle cooldown stamps.
const SWEEP_HORIZON: Duration = Duration::from_secs(60);

pub struct CooldownGate {
    last_processed: DashMap<(i64, u64), Instant>,
    interval: Duration,
}

impl CooldownGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_processed: DashMap::new(),
            interval,
        }
    }

    /// Whether this message may proceed. Records the stamp only when
    /// it does, so a burst cannot keep extending its own cooldown.
    pub fn check(&self, chat_id: ChatId, user_id: UserId, now: Instant) -> bool {
        match self.last_processed.entry((chat_id.0, user_id.0)) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
            Entry::Occupied(mut slot) => {
                if now.duration_since(*slot.get()) < self.interval {
                    false
                } else {
                    *slot.get_mut() = now;
                    true
                }
            }
        }
    }

    /// Drop stamps older than a minute to bound memory.
    pub fn sweep(&self, now: Instant) {
        self.last_processed
            .retain(|_, stamp| now.duration_since(*stamp) <= SWEEP_HORIZON);
    }
}
