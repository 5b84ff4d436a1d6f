//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary values (e.g. the frame window length) from
//! primary ones to avoid drift. Runtime overrides live in [`crate::config`];
//! the constants here are the defaults those overrides fall back to.

/// Maximum seconds of a source processed per ingestion. Longer videos are
/// truncated by the duration governor.
pub const DEFAULT_MAX_VIDEO_DURATION_SECS: f64 = 600.0;

/// Keyframe sampling rate in samples per second. `0.5` means one frame
/// window every two seconds.
pub const DEFAULT_FRAME_SAMPLE_RATE: f64 = 0.5;

/// Hard cap on sampled keyframes per source, independent of duration.
pub const DEFAULT_MAX_KEYFRAMES: usize = 30;

/// Frames wider than this are downscaled (aspect preserved) before OCR.
pub const DEFAULT_MAX_FRAME_WIDTH: u32 = 1280;

/// OCR detections below this confidence are discarded (fail closed).
pub const DEFAULT_OCR_MIN_CONFIDENCE: f32 = 0.3;

/// JPEG quality used when persisting sampled frames.
pub const FRAME_JPEG_QUALITY: u8 = 85;

/// Default number of results returned by a retrieval call.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Layer 1 fetches `limit * RERANK_OVERSAMPLE_FACTOR` candidates when
/// Layer 2 reranking is enabled, so reordering has headroom to promote.
pub const RERANK_OVERSAMPLE_FACTOR: usize = 2;

/// Similarity assumed for a candidate whose store entry carries no score.
pub const DEFAULT_SIMILARITY: f32 = 0.5;

/// Embedding dimension the evidence collection is created with.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

pub const DEFAULT_VECTOR_SIZE_U64: u64 = DEFAULT_EMBEDDING_DIM as u64;
