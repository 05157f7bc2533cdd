use std::fmt;

/// Filesystem-safe identity of a typed word.
///
/// Only ASCII letters survive, lowercased. The same key names every cache file
/// for the word (translation, meanings, audio per accent, image), each with its
/// own suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordKey(String);

impl WordKey {
    /// Returns `None` when nothing usable is left after cleaning
    pub fn new(raw: &str) -> Option<Self> {
        let key = safe_key(raw);
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// "word" -> "Word", for dictionary lookups of proper nouns
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for WordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WordKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strips everything but ASCII letters and lowercases the rest
pub fn safe_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
