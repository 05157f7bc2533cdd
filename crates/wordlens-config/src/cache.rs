use serde::{Deserialize, Serialize};

fn default_data_dir() -> String {
    "Data".to_string()
}

fn default_hover_capacity() -> usize {
    200
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Root of the Dicts/Audio/Images tree
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Entries kept by the in-memory snippet translation cache
    #[serde(default = "default_hover_capacity")]
    pub hover_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            hover_capacity: default_hover_capacity(),
        }
    }
}
