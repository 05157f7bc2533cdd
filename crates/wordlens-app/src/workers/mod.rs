pub mod audio;
pub mod image;
pub mod meanings;
pub mod translation;

pub use audio::AudioWorker;
pub use image::ImageWorker;
pub use meanings::MeaningsWorker;
pub use translation::TranslationWorker;
