//! Error types for mask refinement.

use std::time::Duration;

use thiserror::Error;

/// Hard failures. Any of these aborts refinement of a single image.
#[derive(Debug, Error)]
pub enum RefineError {
    /// The probability grid does not match the image it was computed for.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// (width, height) of the reference raster.
        expected: (u32, u32),
        /// (width, height) that was supplied.
        actual: (u32, u32),
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// The classifier did not answer in time.
    #[error("classifier timed out after {after:?}")]
    ClassifierTimeout {
        /// The timeout that elapsed.
        after: Duration,
    },

    /// The classifier reported a failure of its own.
    #[error("classifier failed: {0}")]
    Classifier(String),

    /// The job was cancelled before it completed.
    #[error("cancelled")]
    Cancelled,

    /// A worker task panicked.
    #[error("worker failed: {0}")]
    Worker(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefineError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid(reason.into())
    }

    /// Creates a classifier failure.
    #[must_use]
    pub fn classifier(reason: impl Into<String>) -> Self {
        Self::Classifier(reason.into())
    }

    /// Creates a dimension mismatch from two `(width, height)` pairs.
    #[must_use]
    pub const fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RefineError>;

/// Non-fatal conditions. The pipeline records them and carries on with a
/// best-effort mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// No foreground survived the named stage.
    EmptyMask { stage: String },
    /// Shape fitting found no contour; the stage passed its input through.
    DegenerateGeometry { strategy: crate::models::Strategy },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::EmptyMask { stage } => write!(f, "empty mask after {stage}"),
            Degradation::DegenerateGeometry { strategy } => {
                write!(f, "no contour for {strategy} fit, input kept")
            }
        }
    }
}
