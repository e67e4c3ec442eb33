//! Configuration module for the Groupwarden bot.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Bot running mode
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Moderation timing thresholds.
///
/// Defaults: 10 messages in 5 seconds triggers a mute, a 10-second
/// quiet gap resets the window, mutes last 120 seconds, and a 500 ms
/// per-user cooldown debounces rapid-fire messages.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Messages within `spam_window` that count as spam.
    pub spam_limit: u32,
    /// Window within which `spam_limit` messages trigger a mute.
    pub spam_window: Duration,
    /// Inactivity horizon after which a spam record is discarded.
    pub reset_window: Duration,
    /// How long a detected spammer stays muted.
    pub mute_duration: Duration,
    /// Minimum gap between processed messages from one user.
    pub cooldown: Duration,
    /// Per-chat capacity of the sent-message history queue.
    pub history_capacity: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            spam_limit: 10,
            spam_window: Duration::from_secs(5),
            reset_window: Duration::from_secs(10),
            mute_duration: Duration::from_secs(120),
            cooldown: Duration::from_millis(500),
            history_capacity: 10,
        }
    }
}

impl Thresholds {
    /// Load thresholds from the environment, keeping defaults for
    /// anything unset or unparsable.
    fn from_env() -> Self {
        let mut t = Self::default();

        if let Some(n) = parse_var::<u32>("SPAM_LIMIT") {
            t.spam_limit = n;
        }
        if let Some(n) = parse_var::<u64>("SPAM_WINDOW_SECS") {
            t.spam_window = Duration::from_secs(n);
        }
        if let Some(n) = parse_var::<u64>("SPAM_RESET_SECS") {
            t.reset_window = Duration::from_secs(n);
        }
        if let Some(n) = parse_var::<u64>("MUTE_SECS") {
            t.mute_duration = Duration::from_secs(n);
        }
        if let Some(n) = parse_var::<u64>("COOLDOWN_MS") {
            t.cooldown = Duration::from_millis(n);
        }
        if let Some(n) = parse_var::<usize>("HISTORY_CAPACITY") {
            t.history_capacity = n;
        }

        t
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Display name used in /start and /help.
    pub bot_name: String,

    /// Bot username (without @). Optional - fetched via getMe if not set.
    pub bot_username: Option<String>,

    /// User IDs the bot ignores entirely (comma-separated).
    pub blocked_users: Vec<u64>,

    /// Directory holding replies.json, badwords.json and welcome.json.
    pub data_dir: PathBuf,

    /// Moderation timing thresholds.
    pub thresholds: Thresholds,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = env::var("BOT_MODE")
            .unwrap_or_else(|_| "polling".to_string())
            .to_lowercase();

        let bot_mode = match bot_mode.as_str() {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = env::var("WEBHOOK_URL").ok();

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let webhook_port = parse_var::<u16>("WEBHOOK_PORT").unwrap_or(8443);
        let webhook_secret = env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());

        let blocked_users = env::var("BLOCKED_USERS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        // Parse bot username (strip @ if present)
        let bot_username = env::var("BOT_USERNAME")
            .ok()
            .map(|s| s.trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty());

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret,
            bot_name: env::var("BOT_NAME").unwrap_or_else(|_| "Groupwarden".to_string()),
            bot_username,
            blocked_users,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            thresholds: Thresholds::from_env(),
        }
    }
}
