//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// Viewport dimensions must be finite and positive
    #[error("Invalid viewport size: {width}x{height}")]
    InvalidViewport {
        /// Rejected width
        width: f32,
        /// Rejected height
        height: f32,
    },

    /// Soft keyboard occlusion cannot be negative
    #[error("Invalid keyboard occlusion height: {0}")]
    InvalidOcclusion(f32),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
