use std::sync::Arc;

use tokio::sync::RwLock;
use wordlens_config::Config;
use wordlens_core::CacheLayout;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub layout: CacheLayout,
}

impl AppState {
    pub fn new(config: Config, layout: CacheLayout) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            layout,
        }
    }
}
