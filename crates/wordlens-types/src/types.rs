use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigChanged,
    RawTextInput {
        text: String,
        source: TextSource,
    },
    /// Clear the previous word's display before the new word's results arrive
    ResetDisplay {
        word: String,
    },
    ShowTranslation {
        word: String,
        record: TranslationRecord,
    },
    ShowMeanings {
        word: String,
        record: MeaningsRecord,
    },
    AudioPlayed {
        word: String,
        accent: Accent,
    },
    ShowImage {
        word: String,
        path: PathBuf,
    },
    ShowSnippet {
        text: String,
        translation: String,
    },
    StatusUpdate(String),
    BackendReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Stdin,
    Clipboard,
    Websocket,
    Manual,
}

/// Identifies the word that is currently relevant to the UI.
///
/// Minted by the coordinator on every accepted submission; workers carry it
/// along with their results but never change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Translation,
    Meanings,
    Audio,
    Image,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Translation => "translation",
            Category::Meanings => "meanings",
            Category::Audio => "audio",
            Category::Image => "image",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pronunciation variant requested from the speech provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    Us,
    Uk,
}

impl Accent {
    /// Suffix used in cache file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Us => "us",
            Accent::Uk => "uk",
        }
    }

    /// BCP 47 tag understood by the speech provider
    pub fn language_tag(&self) -> &'static str {
        match self {
            Accent::Us => "en-US",
            Accent::Uk => "en-GB",
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationSource {
    Cache,
    PrimaryProvider,
    FallbackProvider,
    None,
}

impl TranslationSource {
    pub fn label(&self) -> &'static str {
        match self {
            TranslationSource::Cache => "Cache",
            TranslationSource::PrimaryProvider => "API",
            TranslationSource::FallbackProvider => "Fallback",
            TranslationSource::None => "—",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslationRecord {
    pub word: String,
    pub text: String,
    pub source: TranslationSource,
    pub fetched_at: SystemTime,
}

impl TranslationRecord {
    pub fn new(word: impl Into<String>, text: impl Into<String>, source: TranslationSource) -> Self {
        Self {
            word: word.into(),
            text: text.into(),
            source,
            fetched_at: SystemTime::now(),
        }
    }

    /// Both providers failed; nothing to show
    pub fn unavailable(word: impl Into<String>) -> Self {
        Self::new(word, String::new(), TranslationSource::None)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Raw dictionary payload for a word.
///
/// `meanings` holds the provider's per-part-of-speech objects untouched
/// (definitions, examples, synonyms, antonyms). Any other top-level fields the
/// provider returned end up in `metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeaningsRecord {
    pub word: String,
    #[serde(default)]
    pub meanings: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl MeaningsRecord {
    /// Marker for a word the dictionary has confirmed it does not know
    pub fn empty(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meanings: vec![],
            metadata: serde_json::Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meanings.is_empty()
    }

    /// Part-of-speech labels in provider order
    pub fn parts_of_speech(&self) -> Vec<&str> {
        self.meanings
            .iter()
            .filter_map(|m| m["partOfSpeech"].as_str())
            .collect()
    }
}
