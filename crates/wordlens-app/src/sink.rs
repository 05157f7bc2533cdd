use std::path::PathBuf;

use kanal::AsyncSender;
use wordlens_core::WordKey;
use wordlens_types::{Accent, AppEvent, MeaningsRecord, TranslationRecord};

/// Receiver of everything the coordinator decides to show.
///
/// Called with the coordinator's lock held, so implementations must hand the
/// data off without blocking (queue it, post it to another thread).
pub trait UiSink: Send + Sync {
    /// A new word became active; clear what the previous one showed
    fn on_reset(&self, key: &WordKey);

    fn on_translation_ready(&self, key: &WordKey, record: TranslationRecord);

    fn on_meanings_ready(&self, key: &WordKey, record: MeaningsRecord);

    /// Playback finished and the word is still current
    fn on_audio_played(&self, key: &WordKey, accent: Accent);

    fn on_image_ready(&self, key: &WordKey, path: PathBuf);
}

/// Forwards sink calls to the UI task as `AppEvent`s
#[derive(Clone)]
pub struct ChannelSink {
    tx: AsyncSender<AppEvent>,
}

impl ChannelSink {
    pub fn new(tx: AsyncSender<AppEvent>) -> Self {
        Self { tx }
    }

    fn post(&self, event: AppEvent) {
        match self.tx.try_send(event) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("UI queue full, dropping event"),
            Err(e) => tracing::debug!("UI channel closed: {}", e),
        }
    }
}

impl UiSink for ChannelSink {
    fn on_reset(&self, key: &WordKey) {
        self.post(AppEvent::ResetDisplay {
            word: key.to_string(),
        });
    }

    fn on_translation_ready(&self, key: &WordKey, record: TranslationRecord) {
        self.post(AppEvent::ShowTranslation {
            word: key.to_string(),
            record,
        });
    }

    fn on_meanings_ready(&self, key: &WordKey, record: MeaningsRecord) {
        self.post(AppEvent::ShowMeanings {
            word: key.to_string(),
            record,
        });
    }

    fn on_audio_played(&self, key: &WordKey, accent: Accent) {
        self.post(AppEvent::AudioPlayed {
            word: key.to_string(),
            accent,
        });
    }

    fn on_image_ready(&self, key: &WordKey, path: PathBuf) {
        self.post(AppEvent::ShowImage {
            word: key.to_string(),
            path,
        });
    }
}
