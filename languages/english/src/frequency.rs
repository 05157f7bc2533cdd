use std::collections::HashMap;
use std::path::Path;

use wordlens_core::VocabularyIndex;

/// Words ranked even when no list is installed
const FALLBACK_WORDS: [&str; 6] = ["the", "of", "and", "a", "to", "in"];

/// English word frequency ranks, one word per line, most common first
pub struct EnglishFrequency {
    ranks: HashMap<String, u32>,
}

impl EnglishFrequency {
    /// Rank = position of the first occurrence
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranks = HashMap::new();

        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            let next = ranks.len() as u32;
            ranks.entry(word).or_insert(next);
        }

        Self { ranks }
    }

    pub fn with_defaults() -> Self {
        Self::from_words(FALLBACK_WORDS)
    }

    /// Load a list file; only the first column of each line is used
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let words = content
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        Ok(Self::from_words(words))
    }

    /// Like `load_from_file`, but a missing or unreadable list falls back to the built-in words
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(index) if !index.ranks.is_empty() => {
                tracing::info!("Loaded {} ranked words from {}", index.ranks.len(), path.display());
                index
            }
            Ok(_) => {
                tracing::warn!("Word list {} is empty, using built-in words", path.display());
                Self::with_defaults()
            }
            Err(e) => {
                tracing::warn!("Word list {} unavailable ({}), using built-in words", path.display(), e);
                Self::with_defaults()
            }
        }
    }
}

impl VocabularyIndex for EnglishFrequency {
    fn rank(&self, word: &str) -> Option<u32> {
        self.ranks.get(word).copied()
    }

    fn len(&self) -> usize {
        self.ranks.len()
    }
}
