use serde::{Deserialize, Serialize};

fn default_level() -> u32 {
    10
}

fn default_word_list_path() -> String {
    "Data/vocab_10k.txt".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VocabConfig {
    /// Words ranked below `level * 100` are considered known and skipped
    #[serde(default = "default_level")]
    pub level: u32,
    /// Frequency list, one word per line, most common first
    #[serde(default = "default_word_list_path")]
    pub word_list_path: String,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            word_list_path: default_word_list_path(),
        }
    }
}
