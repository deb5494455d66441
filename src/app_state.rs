use crate::{config::AppConfig, storage::UploadStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, immutable after startup
    pub config: Arc<AppConfig>,
    /// Flat file store rooted at the configured storage directory
    pub store: Arc<UploadStore>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(config: AppConfig) -> std::io::Result<Self> {
        let store = UploadStore::new(&config.storage.root, config.max_upload_bytes())?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }

    /// Get a reference to the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Access the upload store
    pub fn store(&self) -> &UploadStore {
        &self.store
    }
}
