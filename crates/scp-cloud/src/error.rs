//! Provider error types

use crate::api::ApiError;
use thiserror::Error;

/// Provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Missing configuration: {0} (set it in the provider block, the environment, or the profile)")]
    ConfigMissing(String),

    #[error("Unsupported authentication method: {0} (only 'access-key' is supported)")]
    UnsupportedAuth(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid value for '{path}': {message}")]
    InvalidInput { path: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource {id} reached unexpected state '{state}'")]
    UnexpectedState { id: String, state: String },

    #[error("API error{}: {message}", http_status(.status))]
    Transport { status: Option<u16>, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Resource type already registered: {0}")]
    DuplicateRegistration(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Profile error: {0}")]
    Profile(#[from] scp_profile::ProfileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl CloudError {
    pub fn invalid_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<ApiError> for CloudError {
    fn from(err: ApiError) -> Self {
        match err.status {
            Some(404) => CloudError::NotFound(err.message),
            status => CloudError::Transport {
                status,
                message: err.message,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
