use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::config::AppConfig;
use crate::database::InventoryStore;
use crate::graph::DeviceDirectory;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn InventoryStore>,
    pub devices: Arc<dyn DeviceDirectory>,
    /// `None` when authentication is disabled.
    pub tokens: Option<Arc<TokenValidator>>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn InventoryStore>,
        devices: Arc<dyn DeviceDirectory>,
        tokens: Option<Arc<TokenValidator>>,
    ) -> Self {
        Self {
            config,
            store,
            devices,
            tokens,
        }
    }
}
