pub mod dictionary;
pub mod frequency;
pub mod images;
pub mod speech;
pub mod translator;

#[cfg(test)]
mod testing;

pub use dictionary::DictionaryApi;
pub use frequency::EnglishFrequency;
pub use images::{PexelsImages, WikipediaImages};
pub use speech::GoogleTts;
pub use translator::{GoogleTranslate, YandexDictionary};
