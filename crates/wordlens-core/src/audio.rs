use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use wordlens_types::Accent;

use crate::disk_cache::{self, temp_path};
use crate::error::CacheError;
use crate::key::WordKey;

/// Anything shorter is a truncated or error response, not speech
pub const MIN_AUDIO_BYTES: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub word: String,
    pub accent: Accent,
    pub file_path: PathBuf,
}

impl AudioAsset {
    /// Checked against the file on every call
    pub fn is_valid(&self) -> bool {
        is_valid_audio_file(&self.file_path)
    }
}

/// Exists, has at least [`MIN_AUDIO_BYTES`], and starts like an MP3
pub fn is_valid_audio_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() || metadata.len() < MIN_AUDIO_BYTES {
        return false;
    }

    let mut head = [0u8; 3];
    match File::open(path).and_then(|mut f| f.read_exact(&mut head)) {
        Ok(()) => has_mp3_magic(&head),
        Err(_) => false,
    }
}

/// Same check as [`is_valid_audio_file`] for a body not yet written to disk
pub fn is_valid_audio_bytes(bytes: &[u8]) -> bool {
    if (bytes.len() as u64) < MIN_AUDIO_BYTES {
        return false;
    }
    match bytes.first_chunk::<3>() {
        Some(head) => has_mp3_magic(head),
        None => false,
    }
}

/// ID3 tag or a raw MPEG frame sync
fn has_mp3_magic(head: &[u8; 3]) -> bool {
    head == b"ID3" || (head[0] == 0xFF && head[1] & 0xE0 == 0xE0)
}

/// Pronunciation files, one per word and accent
pub struct AudioStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self, key: &WordKey, accent: Accent) -> PathBuf {
        self.dir.join(format!("{}-{}.mp3", key, accent))
    }

    pub fn asset(&self, key: &WordKey, accent: Accent) -> AudioAsset {
        AudioAsset {
            word: key.to_string(),
            accent,
            file_path: self.path(key, accent),
        }
    }

    /// The cached asset when it is playable
    pub fn cached(&self, key: &WordKey, accent: Accent) -> Option<AudioAsset> {
        let asset = self.asset(key, accent);
        asset.is_valid().then_some(asset)
    }

    /// Another download of the same file is in progress
    pub fn download_in_progress(&self, key: &WordKey, accent: Accent) -> bool {
        temp_path(&self.path(key, accent)).exists()
    }

    /// Poll until a concurrent download produces a valid file or `wait` runs out
    pub async fn wait_for_peer(
        &self,
        key: &WordKey,
        accent: Accent,
        wait: Duration,
        poll: Duration,
    ) -> Option<AudioAsset> {
        let poll = poll.max(Duration::from_millis(1));
        let attempts = (wait.as_millis() / poll.as_millis()).max(1);

        for _ in 0..attempts {
            if let Some(asset) = self.cached(key, accent) {
                return Some(asset);
            }
            tokio::time::sleep(poll).await;
        }

        self.cached(key, accent)
    }

    pub async fn store(
        &self,
        key: &WordKey,
        accent: Accent,
        bytes: &[u8],
    ) -> Result<AudioAsset, CacheError> {
        let _guard = self.write_lock.lock().await;
        let asset = self.asset(key, accent);
        disk_cache::write_atomic(&asset.file_path, bytes).await?;
        Ok(asset)
    }

    /// Start writing a file chunk by chunk; it becomes visible on `finish`
    pub async fn begin_stream(
        &self,
        key: &WordKey,
        accent: Accent,
    ) -> Result<AudioStreamWriter, CacheError> {
        fs::create_dir_all(&self.dir).await?;

        let asset = self.asset(key, accent);
        let tmp = temp_path(&asset.file_path);
        let file = fs::File::create(&tmp).await?;

        Ok(AudioStreamWriter {
            asset,
            tmp,
            file,
            chunks: 0,
            bytes: 0,
        })
    }
}

/// In-progress streamed download, readable at `partial_path` while it grows
pub struct AudioStreamWriter {
    asset: AudioAsset,
    tmp: PathBuf,
    file: fs::File,
    chunks: usize,
    bytes: u64,
}

impl AudioStreamWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), CacheError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.file.write_all(chunk).await?;
        self.file.flush().await?;
        self.chunks += 1;
        self.bytes += chunk.len() as u64;
        Ok(())
    }

    pub fn chunks_written(&self) -> usize {
        self.chunks
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// The partially written file, for playback that starts before the download ends
    pub fn partial_asset(&self) -> AudioAsset {
        AudioAsset {
            file_path: self.tmp.clone(),
            ..self.asset.clone()
        }
    }

    /// Sync and move into place
    pub async fn finish(mut self) -> Result<AudioAsset, CacheError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);

        disk_cache::commit(&self.tmp, &self.asset.file_path).await?;
        Ok(self.asset)
    }

    /// Drop the temp file after a failed stream
    pub async fn abandon(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.tmp).await;
    }
}
