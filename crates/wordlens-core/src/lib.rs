pub mod audio;
pub mod disk_cache;
pub mod error;
pub mod image;
pub mod key;
pub mod layout;
pub mod memory_cache;
pub mod preprocess;
pub mod vocabulary;

pub use audio::{AudioAsset, AudioStore};
pub use disk_cache::{AtomicDiskCache, CacheEntry};
pub use error::CacheError;
pub use image::ImageStore;
pub use key::WordKey;
pub use layout::CacheLayout;
pub use memory_cache::BoundedLruCache;
pub use vocabulary::VocabularyIndex;
