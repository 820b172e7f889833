//! Error taxonomy for grid engine operations
//!
//! Every engine operation either fully applies or fully aborts; an `Err`
//! always means the grid and history were left untouched.

use thiserror::Error;

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A size, strength, or text input was rejected
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A cell coordinate fell outside the grid
    #[error("cell ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    /// The encoder could not produce bytes for the requested format
    #[error("encoding failed: {0}")]
    EncodingFailure(String),
    /// Another offloaded edit has not been committed or discarded yet
    #[error("another edit is already in flight")]
    EditInFlight,
    /// An offloaded edit finished against a grid that has since changed
    #[error("edit was computed from an outdated grid")]
    StaleEdit,
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidArgument(message.into())
    }
}

impl From<image::ImageError> for EngineError {
    fn from(e: image::ImageError) -> Self {
        EngineError::EncodingFailure(e.to_string())
    }
}

/// Result alias used throughout the engine
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = EngineError::OutOfBounds { x: 5, y: 2, width: 4, height: 4 };
        assert_eq!(err.to_string(), "cell (5, 2) out of bounds for 4x4 grid");
    }

    #[test]
    fn test_invalid_shorthand() {
        assert_eq!(
            EngineError::invalid("size must be positive"),
            EngineError::InvalidArgument("size must be positive".to_string())
        );
    }
}
