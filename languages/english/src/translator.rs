use async_trait::async_trait;
use serde::Deserialize;
use wordlens_provider::{ProviderError, ProviderMetadata, RetryingHttpClient, TranslationProvider};

/// Most translations kept for one word
const MAX_VARIANTS: usize = 3;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    def: Vec<PartOfSpeech>,
}

#[derive(Debug, Deserialize)]
struct PartOfSpeech {
    #[serde(default)]
    tr: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
struct Variant {
    text: String,
}

/// Keyed dictionary lookup service; returns a few short translations per word
#[derive(Clone)]
pub struct YandexDictionary {
    client: RetryingHttpClient,
    api_key: String,
    lang_pair: String,
    ui_lang: String,
}

impl YandexDictionary {
    pub fn new(client: RetryingHttpClient, api_key: String, from: &str, to: &str) -> Self {
        Self {
            client,
            api_key,
            lang_pair: format!("{}-{}", from, to),
            ui_lang: to.to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for YandexDictionary {
    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationError);
        }

        let params = [
            ("key", self.api_key.as_str()),
            ("lang", self.lang_pair.as_str()),
            ("text", text),
            ("ui", self.ui_lang.as_str()),
        ];
        let response = self.client.get("", &params).await?;

        if !response.is_success() {
            return Err(ProviderError::from_status(response.status));
        }

        let lookup: LookupResponse = response.json()?;
        let joined = collect_variants(&lookup);
        if joined.is_empty() {
            return Err(ProviderError::EmptyResult);
        }

        Ok(joined)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Yandex Dictionary".to_string(),
            requires_api_key: true,
            free_tier_available: true,
        }
    }
}

/// One translation from every part of speech, then more from the first
/// one, up to `MAX_VARIANTS`, joined with ", "
fn collect_variants(lookup: &LookupResponse) -> String {
    let mut collected: Vec<&str> = Vec::new();

    for pos in &lookup.def {
        if let Some(first) = pos.tr.first() {
            if !collected.contains(&first.text.as_str()) {
                collected.push(&first.text);
            }
        }
    }

    if let Some(first_pos) = lookup.def.first() {
        for variant in first_pos.tr.iter().skip(1) {
            if collected.len() >= MAX_VARIANTS {
                break;
            }
            if !collected.contains(&variant.text.as_str()) {
                collected.push(&variant.text);
            }
        }
    }

    collected.truncate(MAX_VARIANTS);
    collected.join(", ")
}

/// Free machine translation endpoint; also used for multi-word snippets
#[derive(Clone)]
pub struct GoogleTranslate {
    client: RetryingHttpClient,
    from: String,
    to: String,
}

impl GoogleTranslate {
    pub fn new(client: RetryingHttpClient, from: &str, to: &str) -> Self {
        Self {
            client,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslate {
    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let params = [
            ("client", "gtx"),
            ("sl", self.from.as_str()),
            ("tl", self.to.as_str()),
            ("dt", "t"),
            ("q", text),
        ];
        let response = self.client.get("", &params).await?;

        if !response.is_success() {
            return Err(ProviderError::from_status(response.status));
        }

        let data: serde_json::Value = response.json()?;
        let joined = join_segments(&data)
            .ok_or_else(|| ProviderError::Malformed("no sentence segments".to_string()))?;
        if joined.trim().is_empty() {
            return Err(ProviderError::EmptyResult);
        }

        Ok(joined)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Google Translate".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

/// The response is `[[["segment", "source", ...], ...], ...]`
fn join_segments(data: &serde_json::Value) -> Option<String> {
    let segments = data.get(0)?.as_array()?;
    Some(
        segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
            .collect(),
    )
}
