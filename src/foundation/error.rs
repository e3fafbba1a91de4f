/// Convenience alias used across the crate.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors produced while rasterizing, caching or compositing vector graphics.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// Invalid input handed to a public API (density, thread count, disposed node).
    #[error("validation error: {0}")]
    Validation(String),

    /// A rasterization request could not produce a bitmap.
    #[error("rasterization error: {0}")]
    Rasterize(String),

    /// Compositing a bitmap into a paint context failed.
    #[error("paint error: {0}")]
    Paint(String),

    /// Failure bubbled up from a third-party layer.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    /// Build a [`RasterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RasterError::Rasterize`].
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Build a [`RasterError::Paint`].
    pub fn paint(msg: impl Into<String>) -> Self {
        Self::Paint(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
