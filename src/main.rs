//! Groupwarden - Telegram group management bot.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `tables` - JSON-backed reply/bad-word/welcome tables
//! - `telegram` - Normalized messages and outbound chat actions
//! - `permissions` - Admin checking with caching
//! - `events` - The message classification pipeline
//! - `plugins` - Command handlers (extensible)
//! - `bot` - Dispatcher wiring and runtime (with Throttle for API
//!   rate limiting)
//! - `utils` - Utility functions

mod bot;
mod config;
mod events;
mod permissions;
mod plugins;
mod tables;
mod telegram;
mod utils;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::AppState;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("groupwarden=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Groupwarden...");

    let config = Config::from_env();
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);
    if !config.blocked_users.is_empty() {
        info!("Ignoring {} blocked users", config.blocked_users.len());
    }

    // Throttle respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    // Prefer the configured username, fall back to getMe
    let bot_username = config
        .bot_username
        .clone()
        .or_else(|| Some(me.username().to_string()));

    let state = AppState::new(bot.clone(), &config, me.id, bot_username);
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    bot::run(&config, dispatcher, bot).await;

    Ok(())
}
