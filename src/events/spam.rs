//! Spam-rate detector.
//!
//! Tracks a `{count, first_seen, last_seen}` record per (chat, user)
//! and flags a sender who reaches the message limit inside the spam
//! window. State is in-memory only and lost on restart.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use teloxide::types::{ChatId, UserId};

use crate::config::Thresholds;

/// Verdict for one recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Ok,
    Spam,
}

#[derive(Debug, Clone, Copy)]
struct SpamRecord {
    count: u32,
    first_seen: Instant,
    last_seen: Instant,
}

/// Sliding-window spam detector keyed by (chat, user).
///
/// The detector only classifies; the mute and warning side effects are
/// the pipeline's job, so a failed mute cannot corrupt window state.
pub struct SpamDetector {
    records: DashMap<(i64, u64), SpamRecord>,
    limit: u32,
    spam_window: Duration,
    reset_window: Duration,
}

impl SpamDetector {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            records: DashMap::new(),
            limit: thresholds.spam_limit,
            spam_window: thresholds.spam_window,
            reset_window: thresholds.reset_window,
        }
    }

    /// Record one message and classify it.
    ///
    /// The spam-window check runs before the reset-window check: a
    /// message satisfying both is spam, not a reset. On `Spam` the
    /// record is cleared so the next message starts a fresh window;
    /// the same happens (with an `Ok` verdict) once the window has
    /// been open longer than the reset horizon.
    pub fn record(&self, user_id: UserId, chat_id: ChatId, now: Instant) -> Decision {
        let key = (chat_id.0, user_id.0);

        match self.records.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(SpamRecord {
                    count: 1,
                    first_seen: now,
                    last_seen: now,
                });
                Decision::Ok
            }
            Entry::Occupied(mut slot) => {
                let rec = slot.get_mut();
                rec.count += 1;
                rec.last_seen = now;
                let elapsed = now.duration_since(rec.first_seen);

                if rec.count >= self.limit && elapsed <= self.spam_window {
                    slot.remove();
                    Decision::Spam
                } else if elapsed > self.reset_window {
                    // Window expired; the current message opens a new
                    // one on the next call.
                    slot.remove();
                    Decision::Ok
                } else {
                    Decision::Ok
                }
            }
        }
    }

    /// Drop records idle past the reset horizon to bound memory.
    pub fn sweep(&self, now: Instant) {
        self.records
            .retain(|_, rec| now.duration_since(rec.last_seen) <= self.reset_window);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.records.len()
    }
}
