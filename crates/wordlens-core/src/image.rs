use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::disk_cache;
use crate::error::CacheError;
use crate::key::WordKey;

/// Illustration images plus `.nofound` markers for words no provider could illustrate
pub struct ImageStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self, key: &WordKey) -> PathBuf {
        self.dir.join(format!("{}.jpg", key))
    }

    pub fn marker_path(&self, key: &WordKey) -> PathBuf {
        self.dir.join(format!("{}.nofound", key))
    }

    pub fn cached(&self, key: &WordKey) -> Option<PathBuf> {
        let path = self.path(key);
        let non_empty = std::fs::metadata(&path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        non_empty.then_some(path)
    }

    pub fn is_marked_not_found(&self, key: &WordKey) -> bool {
        self.marker_path(key).exists()
    }

    pub async fn mark_not_found(&self, key: &WordKey) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        disk_cache::write_atomic(&self.marker_path(key), &[]).await
    }

    pub async fn store(&self, key: &WordKey, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path(key);
        disk_cache::write_atomic(&path, bytes).await?;
        Ok(path)
    }
}
