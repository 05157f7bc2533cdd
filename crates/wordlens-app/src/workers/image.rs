use std::path::PathBuf;
use std::sync::Arc;

use wordlens_core::{ImageStore, WordKey};
use wordlens_provider::ImageProvider;
use wordlens_types::Category;

use crate::pool::{FetchResult, FetchWorker, Reply};

/// Illustrations from the providers in order of preference
pub struct ImageWorker {
    store: ImageStore,
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ImageWorker {
    pub fn new(images_dir: impl Into<PathBuf>, providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self {
            store: ImageStore::new(images_dir),
            providers,
        }
    }

    pub async fn fetch(&self, key: &WordKey) -> Option<PathBuf> {
        if self.store.is_marked_not_found(key) {
            return None;
        }
        if let Some(path) = self.store.cached(key) {
            return Some(path);
        }

        let mut failed = false;
        for provider in &self.providers {
            let name = provider.metadata().name;
            match provider.find_image(key.as_str()).await {
                Ok(Some(bytes)) => match self.store.store(key, &bytes).await {
                    Ok(path) => {
                        tracing::debug!("[{}] image for '{}'", name, key);
                        return Some(path);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to cache image for '{}': {}", key, e);
                        return None;
                    }
                },
                Ok(None) => tracing::debug!("[{}] no image for '{}'", name, key),
                Err(e) => {
                    failed = true;
                    tracing::debug!("[{}] unavailable for '{}': {}", name, key, e);
                }
            }
        }

        // Only a definite "nothing" from every provider is remembered
        if !failed && let Err(e) = self.store.mark_not_found(key).await {
            tracing::warn!("Failed to mark '{}' as having no image: {}", key, e);
        }
        None
    }
}

#[async_trait::async_trait]
impl FetchWorker for ImageWorker {
    fn category(&self) -> Category {
        Category::Image
    }

    async fn run(&self, key: &WordKey, reply: &Reply) {
        let path = self.fetch(key).await;
        reply.deliver(FetchResult::Image(path)).await;
    }
}
