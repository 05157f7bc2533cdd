use serde::{Deserialize, Serialize};

fn default_pexels_url() -> String {
    "https://api.pexels.com/v1/search".to_string()
}

fn default_wiki_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ImageConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub pexels_api_key: String,
    #[serde(default = "default_pexels_url")]
    pub pexels_url: String,
    #[serde(default = "default_wiki_url")]
    pub wiki_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            pexels_api_key: String::new(),
            pexels_url: default_pexels_url(),
            wiki_url: default_wiki_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
