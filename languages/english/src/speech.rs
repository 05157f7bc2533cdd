use async_trait::async_trait;
use futures_util::{StreamExt, future};
use wordlens_provider::{
    ByteStream, ProviderError, ProviderMetadata, RetryingHttpClient, SpeechProvider,
};
use wordlens_types::Accent;

/// Translate's text-to-speech endpoint; answers with mp3 data
#[derive(Clone)]
pub struct GoogleTts {
    client: RetryingHttpClient,
}

impl GoogleTts {
    pub fn new(client: RetryingHttpClient) -> Self {
        Self { client }
    }

    fn params<'a>(word: &'a str, accent: Accent) -> [(&'static str, &'a str); 4] {
        [
            ("ie", "UTF-8"),
            ("tl", accent.language_tag()),
            ("client", "tw-ob"),
            ("q", word),
        ]
    }
}

#[async_trait]
impl SpeechProvider for GoogleTts {
    async fn download(&self, word: &str, accent: Accent) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get("", &Self::params(word, accent)).await?;

        if !response.is_success() {
            return Err(ProviderError::from_status(response.status));
        }
        if response.body.is_empty() {
            return Err(ProviderError::EmptyResult);
        }

        Ok(response.body)
    }

    async fn stream(&self, word: &str, accent: Accent) -> Result<ByteStream, ProviderError> {
        let response = self.client.get_stream("", &Self::params(word, accent)).await?;

        if !(200..300).contains(&response.status) {
            return Err(ProviderError::from_status(response.status));
        }

        let body = response
            .body
            .filter(|chunk| future::ready(!matches!(chunk, Ok(c) if c.is_empty())))
            .boxed();

        Ok(body)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Google TTS".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}
