use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures_util::StreamExt;
use wordlens_core::audio::is_valid_audio_bytes;
use wordlens_core::{AudioAsset, AudioStore, WordKey};
use wordlens_provider::SpeechProvider;
use wordlens_types::{Accent, Category};

use crate::pool::{FetchResult, FetchWorker, Reply};

#[derive(Debug, Clone)]
pub struct AudioSettings {
    pub accent: Accent,
    /// How long to wait for someone else's download of the same file
    pub peer_wait: Duration,
    pub poll_interval: Duration,
    /// Chunks written before playback of a streamed file starts
    pub stream_start_chunks: usize,
}

/// Pronunciation files: cache, a concurrent download, a full download, and
/// finally a stream that starts playing before it completes
pub struct AudioWorker {
    store: AudioStore,
    provider: Arc<dyn SpeechProvider>,
    settings: AudioSettings,
}

impl AudioWorker {
    pub fn new(
        audio_dir: impl Into<PathBuf>,
        provider: Arc<dyn SpeechProvider>,
        settings: AudioSettings,
    ) -> Self {
        Self {
            store: AudioStore::new(audio_dir),
            provider,
            settings,
        }
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Returns the asset if it was not already handed to `reply` mid-stream
    async fn fetch(&self, key: &WordKey, reply: &Reply) -> Option<AudioAsset> {
        let accent = self.settings.accent;

        if let Some(asset) = self.store.cached(key, accent) {
            return Some(asset);
        }

        if self.store.download_in_progress(key, accent) {
            tracing::debug!("Waiting for another download of '{}'", key);
            let waited = self
                .store
                .wait_for_peer(key, accent, self.settings.peer_wait, self.settings.poll_interval)
                .await;
            if waited.is_some() {
                return waited;
            }
        }

        match self.download(key).await {
            Ok(asset) => return Some(asset),
            Err(e) => tracing::debug!("Audio download for '{}' failed, streaming: {:#}", key, e),
        }

        match self.stream(key, reply).await {
            Ok(Streamed::Delivered) => None,
            Ok(Streamed::Finished(asset)) => Some(asset),
            Err(e) => {
                tracing::warn!("No audio for '{}': {:#}", key, e);
                None
            }
        }
    }

    async fn download(&self, key: &WordKey) -> anyhow::Result<AudioAsset> {
        let accent = self.settings.accent;
        let bytes = self.provider.download(key.as_str(), accent).await?;
        if !is_valid_audio_bytes(&bytes) {
            anyhow::bail!("{} bytes is not playable audio", bytes.len());
        }

        Ok(self.store.store(key, accent, &bytes).await?)
    }

    async fn stream(&self, key: &WordKey, reply: &Reply) -> anyhow::Result<Streamed> {
        let accent = self.settings.accent;
        let mut body = self.provider.stream(key.as_str(), accent).await?;
        let mut writer = self.store.begin_stream(key, accent).await?;
        let mut started = false;

        while let Some(chunk) = body.next().await {
            let written = match chunk {
                Ok(chunk) => writer.write_chunk(&chunk).await.map_err(anyhow::Error::from),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = written {
                writer.abandon().await;
                return Err(e).context("audio stream interrupted");
            }

            if !started && writer.chunks_written() >= self.settings.stream_start_chunks {
                started = true;
                reply
                    .deliver(FetchResult::Audio(Some(writer.partial_asset())))
                    .await;
            }
        }

        let asset = writer.finish().await?;
        if started {
            return Ok(Streamed::Delivered);
        }

        if !asset.is_valid() {
            anyhow::bail!("streamed file is not playable audio");
        }
        Ok(Streamed::Finished(asset))
    }
}

enum Streamed {
    /// Playback already started from the partial file
    Delivered,
    Finished(AudioAsset),
}

#[async_trait::async_trait]
impl FetchWorker for AudioWorker {
    fn category(&self) -> Category {
        Category::Audio
    }

    async fn run(&self, key: &WordKey, reply: &Reply) {
        if let Some(asset) = self.fetch(key, reply).await {
            reply.deliver(FetchResult::Audio(Some(asset))).await;
        }
    }
}
