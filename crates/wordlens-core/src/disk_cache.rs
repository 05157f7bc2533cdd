use std::ffi::OsString;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::CacheError;
use crate::key::WordKey;

/// Durable per-word JSON storage for one cache category.
///
/// Every key maps to `<dir>/<key><suffix>`. Writes go through a sibling
/// `.tmp` file and a rename, so a reader sees either the previous file or the
/// new one. Writers of the same category are serialized.
pub struct AtomicDiskCache<T> {
    dir: PathBuf,
    suffix: &'static str,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AtomicDiskCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(dir: impl Into<PathBuf>, suffix: &'static str) -> Self {
        Self {
            dir: dir.into(),
            suffix,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self, key: &WordKey) -> PathBuf {
        self.dir.join(format!("{}{}", key, self.suffix))
    }

    pub fn entry(&self, key: &WordKey) -> CacheEntry<T> {
        CacheEntry::new(self.path(key))
    }

    /// `None` on absence and on unreadable or corrupt files
    pub async fn load(&self, key: &WordKey) -> Option<T> {
        self.entry(key).load().await
    }

    pub async fn store(&self, key: &WordKey, value: &T) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        self.entry(key).store(value).await
    }
}

/// A single cache file
pub struct CacheEntry<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CacheEntry<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Option<T> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read cache file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Corrupt cache file {}, removing: {}",
                    self.path.display(),
                    e
                );
                if let Err(e) = fs::remove_file(&self.path).await {
                    tracing::debug!("Could not remove {}: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    pub async fn store(&self, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        write_atomic(&self.path, &bytes).await
    }
}

/// `<path>.tmp`, the in-progress sibling of a cache file
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `bytes` to `path` through a synced temp file and a rename
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let tmp = write_temp(path, bytes).await?;
    commit(&tmp, path).await
}

pub(crate) async fn write_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf, CacheError> {
    let parent = path
        .parent()
        .ok_or_else(|| CacheError::NoParent(path.display().to_string()))?;
    fs::create_dir_all(parent).await?;

    let tmp = temp_path(path);
    let mut file = fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;

    Ok(tmp)
}

pub(crate) async fn commit(tmp: &Path, path: &Path) -> Result<(), CacheError> {
    if let Err(e) = fs::rename(tmp, path).await {
        let _ = fs::remove_file(tmp).await;
        return Err(e.into());
    }
    Ok(())
}
