use std::path::PathBuf;
use std::sync::Arc;

use wordlens_core::{AtomicDiskCache, WordKey};
use wordlens_provider::{MeaningsLookup, MeaningsProvider, ProviderError};
use wordlens_types::{Category, MeaningsRecord};

use crate::pool::{FetchResult, FetchWorker, Reply};

/// Dictionary entries; confirmed absence is cached as an empty record
pub struct MeaningsWorker {
    cache: AtomicDiskCache<MeaningsRecord>,
    provider: Arc<dyn MeaningsProvider>,
    retry_capitalized: bool,
}

impl MeaningsWorker {
    pub fn new(
        dicts_dir: impl Into<PathBuf>,
        provider: Arc<dyn MeaningsProvider>,
        retry_capitalized: bool,
    ) -> Self {
        Self {
            cache: AtomicDiskCache::new(dicts_dir, "-full.json"),
            provider,
            retry_capitalized,
        }
    }

    pub async fn fetch(&self, key: &WordKey) -> MeaningsRecord {
        if let Some(record) = self.cache.load(key).await {
            return record;
        }

        match self.lookup(key).await {
            Ok(MeaningsLookup::Found(mut record)) => {
                record.word = key.to_string();
                self.persist(key, &record).await;
                record
            }
            Ok(MeaningsLookup::NotFound) => {
                tracing::debug!("No dictionary entry for '{}'", key);
                let record = MeaningsRecord::empty(key.as_str());
                self.persist(key, &record).await;
                record
            }
            Err(e) => {
                tracing::warn!("Dictionary unavailable for '{}': {}", key, e);
                MeaningsRecord::empty(key.as_str())
            }
        }
    }

    async fn lookup(&self, key: &WordKey) -> Result<MeaningsLookup, ProviderError> {
        let first = self.provider.lookup(key.as_str()).await?;
        if !matches!(first, MeaningsLookup::NotFound) || !self.retry_capitalized {
            return Ok(first);
        }

        // Proper nouns are only listed capitalized
        self.provider.lookup(&key.capitalized()).await
    }

    async fn persist(&self, key: &WordKey, record: &MeaningsRecord) {
        if let Err(e) = self.cache.store(key, record).await {
            tracing::warn!("Failed to cache meanings for '{}': {}", key, e);
        }
    }
}

#[async_trait::async_trait]
impl FetchWorker for MeaningsWorker {
    fn category(&self) -> Category {
        Category::Meanings
    }

    async fn run(&self, key: &WordKey, reply: &Reply) {
        let record = self.fetch(key).await;
        reply.deliver(FetchResult::Meanings(record)).await;
    }
}
