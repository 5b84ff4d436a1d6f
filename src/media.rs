//! Media container collaborator traits.
//!
//! Decoding is an external concern: the host wires in whatever backend it
//! links (an ffmpeg binding, a test double). The pipeline only needs the
//! narrow surface below. A container open failure is the one fatal error
//! for a source; everything downstream degrades per frame.

use std::path::Path;

use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors surfaced by media decode backends.
pub enum MediaError {
    /// The container could not be opened at all.
    #[error("failed to open media container '{path}': {message}")]
    OpenFailed {
        /// Source path.
        path: String,
        /// Backend error message.
        message: String,
    },

    /// A single frame could not be decoded.
    #[error("failed to decode frame at {timestamp:.2}s: {message}")]
    FrameDecodeFailed {
        /// Requested timestamp in seconds.
        timestamp: f64,
        /// Backend error message.
        message: String,
    },

    /// The audio track could not be extracted or trimmed.
    #[error("failed to extract audio track: {message}")]
    AudioExtractFailed {
        /// Backend error message.
        message: String,
    },

    #[error("media io error: {0}")]
    Io(#[from] std::io::Error),
}

/// An opened media container: one video stream, at most one audio stream.
pub trait MediaContainer: Send {
    /// Total duration of the source in seconds, before any governing.
    fn duration(&self) -> f64;

    /// Whether the container carries an audio track.
    fn has_audio(&self) -> bool;

    /// Writes the audio track, trimmed to `[0, max_duration]`, as a WAV
    /// file at `dest`.
    fn extract_audio(&mut self, dest: &Path, max_duration: f64) -> Result<(), MediaError>;

    /// Decodes the frame nearest to `timestamp` seconds.
    fn frame_at(&mut self, timestamp: f64) -> Result<RgbImage, MediaError>;
}

/// Opens media containers from paths.
pub trait MediaOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaContainer>, MediaError>;
}
