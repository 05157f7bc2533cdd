use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wordlens_core::{AtomicDiskCache, WordKey};
use wordlens_provider::TranslationProvider;
use wordlens_types::{Category, TranslationRecord, TranslationSource};

use crate::pool::{FetchResult, FetchWorker, Reply};

/// On-disk form of a translation
#[derive(Serialize, Deserialize)]
struct CachedTranslation {
    trans: String,
}

/// Cache, then the keyed primary service, then the free fallback
pub struct TranslationWorker {
    cache: AtomicDiskCache<CachedTranslation>,
    primary: Arc<dyn TranslationProvider>,
    fallback: Arc<dyn TranslationProvider>,
}

impl TranslationWorker {
    pub fn new(
        dicts_dir: impl Into<std::path::PathBuf>,
        primary: Arc<dyn TranslationProvider>,
        fallback: Arc<dyn TranslationProvider>,
    ) -> Self {
        Self {
            cache: AtomicDiskCache::new(dicts_dir, "-trans.json"),
            primary,
            fallback,
        }
    }

    pub async fn fetch(&self, key: &WordKey) -> TranslationRecord {
        if let Some(cached) = self.cache.load(key).await
            && !cached.trans.trim().is_empty()
        {
            return TranslationRecord::new(key.as_str(), cached.trans, TranslationSource::Cache);
        }

        let providers = [
            (&self.primary, TranslationSource::PrimaryProvider),
            (&self.fallback, TranslationSource::FallbackProvider),
        ];

        for (provider, source) in providers {
            let name = provider.metadata().name;
            match provider.translate(key.as_str()).await {
                Ok(text) if !text.trim().is_empty() => {
                    self.persist(key, &text).await;
                    return TranslationRecord::new(key.as_str(), text, source);
                }
                Ok(_) => tracing::debug!("[{}] empty translation for '{}'", name, key),
                Err(e) => tracing::debug!("[{}] unavailable for '{}': {}", name, key, e),
            }
        }

        tracing::warn!("No translation for '{}'", key);
        TranslationRecord::unavailable(key.as_str())
    }

    async fn persist(&self, key: &WordKey, text: &str) {
        let entry = CachedTranslation {
            trans: text.to_string(),
        };
        if let Err(e) = self.cache.store(key, &entry).await {
            tracing::warn!("Failed to cache translation for '{}': {}", key, e);
        }
    }
}

#[async_trait::async_trait]
impl FetchWorker for TranslationWorker {
    fn category(&self) -> Category {
        Category::Translation
    }

    async fn run(&self, key: &WordKey, reply: &Reply) {
        let record = self.fetch(key).await;
        reply.deliver(FetchResult::Translation(record)).await;
    }
}
