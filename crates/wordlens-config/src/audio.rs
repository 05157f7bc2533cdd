use serde::{Deserialize, Serialize};
use wordlens_types::Accent;

fn default_auto_pronounce() -> bool {
    true
}

fn default_tts_url() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

fn default_timeout_ms() -> u64 {
    10000
}

fn default_peer_wait_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_stream_start_chunks() -> usize {
    2
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AudioConfig {
    #[serde(default = "default_auto_pronounce")]
    pub auto_pronounce: bool,
    #[serde(default)]
    pub accent: Accent,
    #[serde(default = "default_tts_url")]
    pub tts_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Command used to play mp3 files, e.g. `mpg123 -q`; playback is skipped when unset
    #[serde(default)]
    pub player_command: Option<String>,
    /// How long to wait for another download of the same file to finish
    #[serde(default = "default_peer_wait_ms")]
    pub peer_wait_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Chunks to buffer before playback starts in streaming mode
    #[serde(default = "default_stream_start_chunks")]
    pub stream_start_chunks: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            auto_pronounce: default_auto_pronounce(),
            accent: Accent::default(),
            tts_url: default_tts_url(),
            timeout_ms: default_timeout_ms(),
            player_command: None,
            peer_wait_ms: default_peer_wait_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            stream_start_chunks: default_stream_start_chunks(),
        }
    }
}
