pub mod http;
pub mod retry;

pub use http::{ByteStream, HttpError, HttpRequest, HttpResponse, HttpStream, HttpTransport, ReqwestTransport};
pub use retry::{RetryPolicy, RetryingHttpClient};

use wordlens_types::{Accent, MeaningsRecord};

/// Word translation provider interface
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate a word or a short text; an empty result is an error
    async fn translate(&self, text: &str) -> Result<String, ProviderError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

/// Dictionary definitions provider interface
#[async_trait::async_trait]
pub trait MeaningsProvider: Send + Sync {
    /// `NotFound` only when the provider confirms it has no entry
    async fn lookup(&self, word: &str) -> Result<MeaningsLookup, ProviderError>;

    fn metadata(&self) -> ProviderMetadata;
}

/// Text-to-speech provider interface
#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Whole audio file in one response
    async fn download(&self, word: &str, accent: Accent) -> Result<Vec<u8>, ProviderError>;

    /// Audio as it arrives
    async fn stream(&self, word: &str, accent: Accent) -> Result<ByteStream, ProviderError>;

    fn metadata(&self) -> ProviderMetadata;
}

/// Illustration image provider interface
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// `Ok(None)` when the provider answered but has no usable image
    async fn find_image(&self, word: &str) -> Result<Option<Vec<u8>>, ProviderError>;

    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub enum MeaningsLookup {
    Found(MeaningsRecord),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
    pub free_tier_available: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] HttpError),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Empty result")]
    EmptyResult,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,
}

impl ProviderError {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => ProviderError::RateLimitExceeded,
            401 | 403 => ProviderError::AuthenticationError,
            _ => ProviderError::Status(status),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}
