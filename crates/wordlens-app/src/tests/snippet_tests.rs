use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use wordlens_provider::{ProviderError, ProviderMetadata, TranslationProvider};

use super::support::wait_until;
use crate::snippet::SnippetTranslator;

/// Uppercases its input; the first call waits for `release`
struct SlowFirst {
    calls: AtomicUsize,
    release: Semaphore,
}

impl SlowFirst {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            release: Semaphore::new(0),
        })
    }
}

#[async_trait::async_trait]
impl TranslationProvider for SlowFirst {
    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let _permit = self.release.acquire().await;
        }
        if text == "broken" {
            return Err(ProviderError::Status(500));
        }
        Ok(text.to_uppercase())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "slow".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

#[tokio::test]
async fn repeated_text_is_served_from_memory() {
    let provider = SlowFirst::new();
    provider.release.add_permits(1);
    let snippets = SnippetTranslator::new(provider.clone(), 8);

    assert_eq!(snippets.translate("good night").await.as_deref(), Some("GOOD NIGHT"));
    assert_eq!(snippets.translate("  good night ").await.as_deref(), Some("GOOD NIGHT"));

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(snippets.cached_len(), 1);
}

#[tokio::test]
async fn superseded_request_is_neither_shown_nor_cached() {
    let provider = SlowFirst::new();
    let snippets = Arc::new(SnippetTranslator::new(provider.clone(), 8));

    let first = {
        let snippets = snippets.clone();
        tokio::spawn(async move { snippets.translate("hello world").await })
    };
    wait_until("first request sent", || provider.calls.load(Ordering::SeqCst) == 1).await;

    assert_eq!(snippets.translate("good night").await.as_deref(), Some("GOOD NIGHT"));

    provider.release.add_permits(1);
    assert_eq!(first.await.unwrap(), None);
    assert_eq!(snippets.cached_len(), 1);
}

#[tokio::test]
async fn failures_and_blank_text_give_nothing() {
    let provider = SlowFirst::new();
    provider.release.add_permits(1);
    let snippets = SnippetTranslator::new(provider.clone(), 8);

    assert_eq!(snippets.translate("   ").await, None);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

    assert_eq!(snippets.translate("broken").await, None);
    assert_eq!(snippets.cached_len(), 0);
}
