use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

/// Result of running the note-append command. The caller decides what a
/// non-zero exit or stderr chatter means for the user.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// External tools the pipeline shells out to. Injected so tests can
/// substitute fakes.
#[async_trait]
pub trait ExternalTools: Send + Sync {
    /// Append one note line to the journal.
    async fn append_note(&self, line: &str) -> Result<CommandOutcome>;

    /// Convert a downloaded recording into an MP3 at `dst`.
    async fn transcode(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// The real thing: `lsq -a "<line>"` and ffmpeg.
pub struct ShellTools {
    note_command: String,
}

impl ShellTools {
    pub fn new() -> Self {
        Self {
            note_command: "lsq".to_string(),
        }
    }
}

impl Default for ShellTools {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExternalTools for ShellTools {
    async fn append_note(&self, line: &str) -> Result<CommandOutcome> {
        let output = tokio::process::Command::new(&self.note_command)
            .arg("-a")
            .arg(line)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.note_command))?;

        Ok(CommandOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    async fn transcode(&self, src: &Path, dst: &Path) -> Result<()> {
        info!("Converting {} to {}", src.display(), dst.display());

        let output = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(src)
            .args(["-codec:a", "libmp3lame", "-qscale:a", "2"])
            .arg(dst)
            .output()
            .await
            .context("Failed to run ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "ffmpeg exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }
}
