mod assets;
mod bot;
mod config;
mod external;
mod note;
mod pipeline;

use std::sync::Arc;

use anyhow::Result;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lsqbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from the environment (and .env, if present)
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let assets_dir = config.ensure_assets_dir()?;
    info!("Media files will be saved to: {}", assets_dir.display());

    let bot = Bot::new(&config.bot_token);
    let state = Arc::new(AppState::new(&config, bot.clone()));

    info!("Bot is starting...");
    bot::run(bot, state).await?;

    Ok(())
}
