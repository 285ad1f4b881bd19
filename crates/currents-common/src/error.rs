//! Error types shared by the tidal-currents crates.

use thiserror::Error;

/// Result type alias using CurrentsError.
pub type CurrentsResult<T> = Result<T, CurrentsError>;

/// Primary error type for loading, interpolating and animating currents.
#[derive(Debug, Error)]
pub enum CurrentsError {
    // === Data Errors ===
    /// The date index or station list has not been loaded yet.
    #[error("Index not loaded: {0}")]
    IndexMissing(String),

    /// A partition (or index) fetch or parse failed.
    #[error("Failed to load {resource}: {message}")]
    DataLoad { resource: String, message: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTime(String),

    // === Interpolation Errors ===
    /// Fewer usable samples than the interpolation mode requires.
    #[error("Need at least {required} samples to interpolate, found {found}")]
    InsufficientSamples { required: usize, found: usize },

    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    // === Setup Errors ===
    #[error("Invalid boundary: {0}")]
    Boundary(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CurrentsError {
    /// Create a DataLoad error for a resource.
    pub fn data_load(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create an Interpolation error.
    pub fn interpolation(msg: impl Into<String>) -> Self {
        Self::Interpolation(msg.into())
    }

    /// Whether navigation may continue with the data already in memory.
    ///
    /// Only partition load failures are recoverable; every other error is
    /// terminal for the operation that produced it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CurrentsError::DataLoad { .. })
    }
}

impl From<serde_json::Error> for CurrentsError {
    fn from(err: serde_json::Error) -> Self {
        CurrentsError::DataLoad {
            resource: "json".to_string(),
            message: err.to_string(),
        }
    }
}
