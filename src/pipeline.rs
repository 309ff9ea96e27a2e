use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::assets::{self, AssetStore};
use crate::external::ExternalTools;
use crate::note::{self, NoteKind};

/// How a save ended, short of an error. `Warning` means the note command
/// exited cleanly but wrote to stderr; the note is still considered saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Ok,
    Warning(String),
    Ignored,
}

/// Resolves platform file ids to fetchable paths and streams them to disk.
/// Abstracted from the Telegram client so the pipeline can be tested with
/// a fake.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Look up the remote path for a file id. Failing to produce a path is
    /// a "source unavailable" error.
    async fn resolve(&self, file_id: &str) -> Result<String>;

    /// Stream the remote file to `dest`. Returns only once every byte has
    /// been flushed to disk.
    async fn download(&self, remote_path: &str, dest: &Path) -> Result<()>;
}

/// The real source, backed by the Telegram Bot API.
pub struct TelegramSource {
    bot: Bot,
}

impl TelegramSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaSource for TelegramSource {
    async fn resolve(&self, file_id: &str) -> Result<String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_owned()))
            .await
            .context("File lookup failed")?;

        if file.path.is_empty() {
            anyhow::bail!("Could not get file path from Telegram");
        }

        Ok(file.path)
    }

    async fn download(&self, remote_path: &str, dest: &Path) -> Result<()> {
        let mut out = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        self.bot
            .download_file(remote_path, &mut out)
            .await
            .with_context(|| format!("Failed to download {remote_path}"))?;

        out.flush()
            .await
            .with_context(|| format!("Failed to flush {}", dest.display()))?;

        Ok(())
    }
}

/// The ingestion pipeline: classify, resolve, download, (transcode),
/// format a note line, hand it to the note command. One call per message.
pub struct Pipeline<S, T> {
    assets: AssetStore,
    source: S,
    tools: T,
}

impl<S: MediaSource, T: ExternalTools> Pipeline<S, T> {
    pub fn new(assets: AssetStore, source: S, tools: T) -> Self {
        Self {
            assets,
            source,
            tools,
        }
    }

    /// Run the note-append command and map its exit code and stderr onto
    /// the reply policy: non-zero exit is an error, stderr on a clean exit
    /// is a warning, silence is success.
    async fn append(&self, line: &str) -> Result<Saved> {
        let outcome = self.tools.append_note(line).await?;

        if !outcome.success() {
            anyhow::bail!(
                "note command exited with code {}: {}",
                outcome.exit_code,
                outcome.stderr
            );
        }

        if !outcome.stderr.is_empty() {
            return Ok(Saved::Warning(outcome.stderr));
        }

        Ok(Saved::Ok)
    }

    /// Save a plain text message. Bot commands are ignored.
    pub async fn save_text(&self, text: &str) -> Result<Saved> {
        if text.starts_with('/') {
            return Ok(Saved::Ignored);
        }

        let line = note::format_note(&NoteKind::Text(text), None, None);
        self.append(&line).await
    }

    pub async fn save_photo(&self, file_id: &str, caption: Option<&str>) -> Result<Saved> {
        let remote = self.source.resolve(file_id).await?;

        let name = assets::photo_filename(&remote);
        let dest = self.assets.path_for(&name);
        info!("Downloading photo to {}", dest.display());
        self.source.download(&remote, &dest).await?;

        let line = note::format_note(&NoteKind::Photo, caption, Some(&name));
        self.append(&line).await
    }

    pub async fn save_video(&self, file_id: &str, caption: Option<&str>) -> Result<Saved> {
        let remote = self.source.resolve(file_id).await?;

        let name = assets::video_filename(&remote);
        let dest = self.assets.path_for(&name);
        info!("Downloading video to {}", dest.display());
        self.source.download(&remote, &dest).await?;

        let line = note::format_note(&NoteKind::Video, caption, Some(&name));
        self.append(&line).await
    }

    pub async fn save_document(
        &self,
        file_id: &str,
        declared_name: Option<&str>,
        caption: Option<&str>,
    ) -> Result<Saved> {
        let remote = self.source.resolve(file_id).await?;

        let name = assets::document_filename(declared_name, &remote);
        let dest = self.assets.path_for(&name);
        info!("Downloading document to {}", dest.display());
        self.source.download(&remote, &dest).await?;

        let line = note::format_note(&NoteKind::Document { name: &name }, caption, Some(&name));
        self.append(&line).await
    }

    pub async fn save_audio(
        &self,
        file_id: &str,
        declared_name: Option<&str>,
        title: Option<&str>,
        caption: Option<&str>,
    ) -> Result<Saved> {
        let remote = self.source.resolve(file_id).await?;

        let name = assets::audio_filename(declared_name, title, &remote);
        let dest = self.assets.path_for(&name);
        info!("Downloading audio to {}", dest.display());
        self.source.download(&remote, &dest).await?;

        let line = note::format_note(&NoteKind::Audio { name: &name }, caption, Some(&name));
        self.append(&line).await
    }

    /// Voice messages are downloaded as the platform's recording container,
    /// transcoded to MP3, and the intermediate recording is removed. On a
    /// transcode failure the intermediate stays on disk.
    pub async fn save_voice(
        &self,
        file_id: &str,
        duration_secs: u32,
        caption: Option<&str>,
    ) -> Result<Saved> {
        let remote = self.source.resolve(file_id).await?;

        let (ogg_name, mp3_name) = assets::voice_filenames(&remote);
        let ogg_path = self.assets.path_for(&ogg_name);
        let mp3_path = self.assets.path_for(&mp3_name);

        info!("Downloading voice message to {}", ogg_path.display());
        self.source.download(&remote, &ogg_path).await?;

        info!("Voice message downloaded, converting to MP3");
        self.tools.transcode(&ogg_path, &mp3_path).await?;

        if let Err(e) = tokio::fs::remove_file(&ogg_path).await {
            warn!("Failed to remove temp file {}: {}", ogg_path.display(), e);
        }

        let duration = (duration_secs > 0).then_some(duration_secs);
        let line = note::format_note(
            &NoteKind::Voice {
                duration_secs: duration,
            },
            caption,
            Some(&mp3_name),
        );
        self.append(&line).await
    }
}
