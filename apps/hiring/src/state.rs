use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::store::{HttpRecordStore, RecordStore};

/// Shared handles the wizards run against.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable record store. Default: `HttpRecordStore` built from `config`.
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let store = HttpRecordStore::from_config(&config)?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }
}
