//! Shared application state for the server.

use std::sync::Arc;

use super::pages::Pages;
use crate::config::ShardConfig;
use crate::storage::UploadStorage;

/// Shared application state.
///
/// Everything a handler needs is passed in here; there is no global state
/// and nothing survives between requests besides the files in storage.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ShardConfig>,
    pub storage: UploadStorage,
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(config: ShardConfig, storage: UploadStorage) -> Result<Self, minijinja::Error> {
        Ok(Self {
            config: Arc::new(config),
            storage,
            pages: Arc::new(Pages::new()?),
        })
    }
}
