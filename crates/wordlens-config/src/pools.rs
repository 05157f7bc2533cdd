use serde::{Deserialize, Serialize};

fn default_translation_workers() -> usize {
    2
}

fn default_meanings_workers() -> usize {
    2
}

fn default_audio_workers() -> usize {
    1
}

fn default_image_workers() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    64
}

/// Worker counts per fetch category
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PoolConfig {
    #[serde(default = "default_translation_workers")]
    pub translation_workers: usize,
    #[serde(default = "default_meanings_workers")]
    pub meanings_workers: usize,
    /// Kept at one so downloads never run in parallel with each other
    #[serde(default = "default_audio_workers")]
    pub audio_workers: usize,
    #[serde(default = "default_image_workers")]
    pub image_workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            translation_workers: default_translation_workers(),
            meanings_workers: default_meanings_workers(),
            audio_workers: default_audio_workers(),
            image_workers: default_image_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}
