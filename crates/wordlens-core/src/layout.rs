use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DICTS: &str = "Dicts";
const AUDIO: &str = "Audio";
const IMAGES: &str = "Images";

/// Directory tree shared by every cache category.
///
/// Files in the data root itself (the frequency list) are not part of the
/// cache and survive `clear`.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dicts_dir(&self) -> PathBuf {
        self.root.join(DICTS)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES)
    }

    fn cache_dirs(&self) -> [PathBuf; 3] {
        [self.images_dir(), self.dicts_dir(), self.audio_dir()]
    }

    pub fn ensure(&self) -> io::Result<()> {
        for dir in self.cache_dirs() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Total bytes under the data root, skipping entries that vanish mid-walk
    pub fn size_bytes(&self) -> u64 {
        dir_size(&self.root)
    }

    pub fn size_mb(&self) -> f64 {
        let mb = self.size_bytes() as f64 / 1_048_576.0;
        (mb * 10.0).round() / 10.0
    }

    /// Delete every cached file, keep the directories. Returns the count removed.
    pub fn clear(&self) -> usize {
        let mut deleted = 0;

        for dir in self.cache_dirs() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", dir.display(), e);
                    continue;
                }
            };

            for entry in entries.flatten() {
                let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
                if !is_file {
                    continue;
                }
                match fs::remove_file(entry.path()) {
                    Ok(()) => deleted += 1,
                    Err(e) => tracing::warn!("Could not delete {}: {}", entry.path().display(), e),
                }
            }
        }

        tracing::info!("Cleared {} cached files", deleted);
        deleted
    }
}

fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .map(|entry| match entry.file_type() {
            Ok(t) if t.is_dir() => dir_size(&entry.path()),
            Ok(_) => entry.metadata().map(|m| m.len()).unwrap_or(0),
            Err(_) => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_directories_and_root_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CacheLayout::new(dir.path());
        layout.ensure().unwrap();

        fs::write(layout.dicts_dir().join("cat-trans.json"), b"{}").unwrap();
        fs::write(layout.audio_dir().join("cat-us.mp3"), vec![0u8; 100]).unwrap();
        fs::write(layout.images_dir().join("cat.nofound"), b"").unwrap();
        fs::write(dir.path().join("vocab_10k.txt"), b"the\nof").unwrap();

        assert_eq!(layout.size_bytes(), 2 + 100 + 6);
        assert_eq!(layout.clear(), 3);

        assert!(layout.dicts_dir().is_dir());
        assert!(layout.audio_dir().is_dir());
        assert!(dir.path().join("vocab_10k.txt").exists());
        assert_eq!(layout.size_bytes(), 6);
    }

    #[test]
    fn missing_root_is_empty() {
        let layout = CacheLayout::new("/nonexistent/wordlens/data");
        assert_eq!(layout.size_bytes(), 0);
        assert_eq!(layout.clear(), 0);
    }
}
