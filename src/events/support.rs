//! Injectable runtime capabilities.
//!
//! Time, sleeping and randomness are seams so the pipeline is
//! deterministic under test: the real implementations use the system
//! clock, tokio timers and the thread RNG; tests swap in a manual
//! clock, a no-op delay and a seeded selector.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;

/// Source of monotonic time for spam windows and cooldowns.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Asynchronous sleep used for the simulated typing latency.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// tokio-backed delay.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Chooses reply candidates and typing delays.
pub trait ReplySelector: Send + Sync {
    /// Index into a non-empty candidate list of length `len`.
    fn pick(&self, len: usize) -> usize;

    /// Simulated typing latency before an auto-reply (0.5-2 s).
    fn typing_delay(&self) -> Duration;
}

/// Thread-RNG selector used in production.
pub struct RandomSelector;

impl ReplySelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn typing_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(500..2000))
    }
}
