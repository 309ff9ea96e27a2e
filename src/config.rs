use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Runtime configuration, read once at startup and passed into the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub logseq_path: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `BOT_TOKEN` is required; `LOGSEQ_PATH` defaults to the current
    /// directory. Media files land in `<LOGSEQ_PATH>/assets`.
    pub fn from_env() -> Result<Self> {
        let bot_token =
            std::env::var("BOT_TOKEN").context("BOT_TOKEN environment variable is not set")?;

        let logseq_path = std::env::var("LOGSEQ_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./"));

        Ok(Self {
            bot_token,
            logseq_path,
        })
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.logseq_path.join("assets")
    }

    /// Create the assets directory if it does not exist yet.
    pub fn ensure_assets_dir(&self) -> Result<PathBuf> {
        let dir = self.assets_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create assets directory: {}", dir.display())
            })?;
            info!("Created assets directory at {}", dir.display());
        }
        Ok(dir)
    }
}
