//! Profile store error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Invalid property line '{0}': expected exactly one '=' between key and value")]
    InvalidInput(String),

    #[error("Section not found: {0}")]
    NotFound(String),

    #[error("Home directory could not be determined")]
    HomeDirNotFound,

    #[error("Unknown profile file: {0}")]
    UnknownProfileFile(String),

    #[error("IO error: {path}\nReason: {message}")]
    FileError { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
