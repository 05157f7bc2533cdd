/// Rank assumed for words missing from the frequency list
pub const UNKNOWN_RANK: u32 = 99_999;

/// Words per vocabulary level step
pub const WORDS_PER_LEVEL: u32 = 100;

/// Word frequency data used to skip words the user already knows
pub trait VocabularyIndex: Send + Sync {
    /// Frequency rank (0 = most common), `None` if not in the list
    fn rank(&self, word: &str) -> Option<u32>;

    /// Number of ranked words
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the word ranks inside the first `level * 100` words
    fn is_word_too_simple(&self, word: &str, level: u32) -> bool {
        let word = word.trim().to_lowercase();
        let rank = self.rank(&word).unwrap_or(UNKNOWN_RANK);
        rank < level.saturating_mul(WORDS_PER_LEVEL)
    }
}
