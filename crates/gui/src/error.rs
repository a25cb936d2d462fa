//! Error types for asset loading

use shared::AssetFormat;
use thiserror::Error;

use crate::state::loads::LoadKind;

/// Errors that can abort a load. Picks never fail; a miss is a valid outcome.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("asset not found: {path}")]
    NotFound { path: String },

    #[error("failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },

    #[error("invalid {format} data: {message}")]
    Format { format: AssetFormat, message: String },

    #[error("load of {path} aborted: {message}")]
    Aborted { path: String, message: String },

    #[error("a {0} load is already in progress")]
    Busy(LoadKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub fn format(format: AssetFormat, message: impl Into<String>) -> Self {
        LoadError::Format {
            format,
            message: message.into(),
        }
    }

    /// True for network/IO failures, false for parse failures
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            LoadError::NotFound { .. } | LoadError::Fetch { .. } | LoadError::Io(_)
        )
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
