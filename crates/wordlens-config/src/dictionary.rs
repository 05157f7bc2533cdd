use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries/en".to_string()
}

fn default_timeout_ms() -> u64 {
    10000
}

fn default_retry_capitalized() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Ask again with "Word" when "word" has no entry (proper nouns)
    #[serde(default = "default_retry_capitalized")]
    pub retry_capitalized: bool,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_ms: default_timeout_ms(),
            retry_capitalized: default_retry_capitalized(),
        }
    }
}
