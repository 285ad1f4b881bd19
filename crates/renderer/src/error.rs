//! Error types for rendering.

use thiserror::Error;

use currents_common::CurrentsError;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} raster")]
    Allocation { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Currents(#[from] CurrentsError),
}

impl From<RenderError> for CurrentsError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Currents(inner) => inner,
            other => CurrentsError::Boundary(other.to_string()),
        }
    }
}
