use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default input preprocessor
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFKC) folds fullwidth letters and ligatures
        let text: String = text.nfkc().collect();

        // Collapse newlines and runs of whitespace
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
