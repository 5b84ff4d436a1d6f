//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number")]
    InvalidNumber { name: String, value: String },

    /// Frame sample rate must be a positive, finite number of samples/sec.
    #[error("frame sample rate must be positive, got {value}")]
    NonPositiveSampleRate { value: f64 },

    /// The per-source duration ceiling must be positive and finite.
    #[error("max video duration must be positive, got {value}")]
    NonPositiveDuration { value: f64 },

    /// The OCR confidence floor must lie in `[0,1]`.
    #[error("OCR confidence floor must be within [0,1], got {value}")]
    ConfidenceOutOfRange { value: f32 },

    /// A zero frame width would make every downscale degenerate.
    #[error("max frame width must be non-zero")]
    ZeroFrameWidth,

    /// The OCR engine needs at least one language.
    #[error("OCR language list is empty")]
    NoOcrLanguages,
}
