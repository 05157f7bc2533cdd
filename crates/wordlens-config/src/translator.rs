use serde::{Deserialize, Serialize};

fn default_primary_url() -> String {
    "https://dictionary.yandex.net/api/v1/dicservice.json/lookup".to_string()
}

fn default_fallback_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_from_lang() -> String {
    "en".to_string()
}

fn default_to_lang() -> String {
    "ru".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Key for the primary dictionary service; the primary is skipped when empty
    #[serde(default)]
    pub primary_api_key: String,
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_from_lang")]
    pub from_lang: String,
    #[serde(default = "default_to_lang")]
    pub to_lang: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TranslatorConfig {
    /// Language pair in the `en-ru` form the primary service expects
    pub fn lang_pair(&self) -> String {
        format!("{}-{}", self.from_lang, self.to_lang)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            primary_api_key: String::new(),
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            from_lang: default_from_lang(),
            to_lang: default_to_lang(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
