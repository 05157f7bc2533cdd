use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Plays a pronunciation file to completion
#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, path: &Path) -> anyhow::Result<()>;
}

/// Runs an external player such as `mpg123 -q` with the file path appended
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    // One sound at a time
    playing: Mutex<()>,
}

impl CommandPlayer {
    /// `None` for a blank command line
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;

        Some(Self {
            program,
            args: parts.collect(),
            playing: Mutex::new(()),
        })
    }
}

#[async_trait::async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, path: &Path) -> anyhow::Result<()> {
        let path = playable_path(path);
        let _guard = self.playing.lock().await;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("failed to start {}", self.program))?;

        if !status.success() {
            anyhow::bail!("{} exited with {}", self.program, status);
        }

        Ok(())
    }
}

/// No player configured
pub struct SilentPlayer;

#[async_trait::async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, path: &Path) -> anyhow::Result<()> {
        tracing::debug!("Audio ready (no player configured): {}", path.display());
        Ok(())
    }
}

/// A streamed `.tmp` file may have been renamed into place before playback starts
fn playable_path(path: &Path) -> PathBuf {
    if !path.exists() && path.extension().is_some_and(|ext| ext == "tmp") {
        return path.with_extension("");
    }
    path.to_path_buf()
}
