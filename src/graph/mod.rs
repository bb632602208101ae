//! Microsoft Graph access for Intune managed-device lookups.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::dto::IntuneDeviceDto;

pub use client::GraphClient;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph integration is not configured")]
    NotConfigured,

    #[error("{0}")]
    NotFound(String),

    #[error("Graph request timed out: {0}")]
    Timeout(String),

    #[error("Graph denied the request: {0}")]
    Forbidden(String),

    #[error("Failed to acquire Graph token: {0}")]
    Token(String),

    #[error("Graph returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Graph request failed: {0}")]
    Transport(String),

    #[error("Unexpected Graph response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GraphError::Timeout(err.to_string())
        } else if err.is_decode() {
            GraphError::Decode(err.to_string())
        } else {
            GraphError::Transport(err.to_string())
        }
    }
}

/// Source of Intune device records. `filter` arguments are complete OData
/// `$filter` expressions built by the caller from sanitized values.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    async fn get_device(&self, device_id: &str) -> Result<IntuneDeviceDto, GraphError>;
    async fn find_devices(&self, filter: &str, top: u32) -> Result<Vec<IntuneDeviceDto>, GraphError>;
}

/// Used when no Graph credentials are configured.
pub struct DisabledDirectory;

#[async_trait]
impl DeviceDirectory for DisabledDirectory {
    async fn get_device(&self, _device_id: &str) -> Result<IntuneDeviceDto, GraphError> {
        Err(GraphError::NotConfigured)
    }

    async fn find_devices(&self, _filter: &str, _top: u32) -> Result<Vec<IntuneDeviceDto>, GraphError> {
        Err(GraphError::NotConfigured)
    }
}
