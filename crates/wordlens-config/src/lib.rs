use std::env;

use serde::{Deserialize, Serialize};

use self::audio::AudioConfig;
use self::cache::CacheConfig;
use self::dictionary::DictionaryConfig;
use self::images::ImageConfig;
use self::input::InputConfig;
use self::network::NetworkConfig;
use self::pools::PoolConfig;
use self::translator::TranslatorConfig;
use self::vocab::VocabConfig;

pub mod audio;
pub mod cache;
pub mod dictionary;
pub mod images;
pub mod input;
pub mod network;
pub mod pools;
pub mod translator;
pub mod vocab;

#[derive(Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub translator: TranslatorConfig,
    pub dictionary: DictionaryConfig,
    pub audio: AudioConfig,
    pub images: ImageConfig,
    pub cache: CacheConfig,
    pub vocab: VocabConfig,
    pub input: InputConfig,
    pub pools: PoolConfig,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Environment wins over whatever a profile file said
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var("YANDEX_KEY") {
            self.translator.primary_api_key = key;
        }

        if let Ok(key) = env::var("PEXELS_KEY") {
            self.images.pexels_api_key = key;
        }

        if let Ok(dir) = env::var("WORDLENS_DATA_DIR") {
            self.cache.data_dir = dir;
        }

        if let Some(flag) = env::var("AUTO_PRONOUNCE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.audio.auto_pronounce = flag;
        }

        if let Some(level) = env::var("VOCAB_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.vocab.level = level;
        }

        if let Ok(url) = env::var("WS_URL") {
            self.input.ws_url = url;
        }

        if let Ok(command) = env::var("AUDIO_PLAYER") {
            self.audio.player_command = Some(command).filter(|c| !c.trim().is_empty());
        }
    }
}
