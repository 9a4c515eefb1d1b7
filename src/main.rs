mod bot;
mod config;
mod dispatch;
mod llm;
mod owner;
mod platform;
mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::llm::GeminiClient;
use crate::platform::telegram::{self, TelegramMessenger};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gemini_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let env_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".env"));

    info!("Loading configuration from: {}", env_path.display());
    let config = Config::load(&env_path)
        .with_context(|| format!("Failed to load config from {}", env_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Model: {}", llm::MODEL);
    info!("  Gemini API key configured: {}", config.has_api_key());
    info!("  Owner: {}", config.owner_id);

    let telegram_bot = teloxide::Bot::new(&config.bot_token);
    let messenger = Arc::new(TelegramMessenger::new(telegram_bot.clone()));
    let generator = Arc::new(GeminiClient::new(config.google_api_key.clone()));
    let handler = Arc::new(bot::build_handler(&config, messenger, generator));

    info!("Bot is starting...");
    telegram::run(telegram_bot, handler).await?;

    Ok(())
}
