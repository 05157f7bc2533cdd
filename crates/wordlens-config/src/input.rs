use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Stdin,
    Clipboard,
    Websocket,
}

fn default_ws_url() -> String {
    "ws://localhost:8080".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    #[serde(default)]
    pub source: InputSource,
    /// WebSocket URL to connect to when `source` is `websocket`
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: InputSource::default(),
            ws_url: default_ws_url(),
        }
    }
}
