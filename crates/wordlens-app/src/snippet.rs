use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use wordlens_core::BoundedLruCache;
use wordlens_provider::TranslationProvider;

/// Translations of multi-word text, remembered in memory only
pub struct SnippetTranslator {
    cache: BoundedLruCache<String, String>,
    provider: Arc<dyn TranslationProvider>,
    latest: AtomicU64,
}

impl SnippetTranslator {
    pub fn new(provider: Arc<dyn TranslationProvider>, capacity: usize) -> Self {
        Self {
            cache: BoundedLruCache::new(capacity),
            provider,
            latest: AtomicU64::new(0),
        }
    }

    /// `None` when the provider fails or a newer request was made while this
    /// one was waiting; only the newest request's result is cached
    pub async fn translate(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(hit) = self.cache.get(&text.to_string()) {
            return Some(hit);
        }

        let request = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let translated = match self.provider.translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::debug!("Snippet translation failed: {}", e);
                return None;
            }
        };

        if self.latest.load(Ordering::SeqCst) != request {
            tracing::debug!("Snippet translation superseded");
            return None;
        }

        self.cache.put(text.to_string(), translated.clone());
        Some(translated)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
