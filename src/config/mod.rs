//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TRACE_*` environment
//! variables. A [`Config`] is threaded explicitly through component
//! constructors; there is no global configuration state.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_FRAME_SAMPLE_RATE, DEFAULT_MAX_FRAME_WIDTH, DEFAULT_MAX_KEYFRAMES,
    DEFAULT_MAX_VIDEO_DURATION_SECS, DEFAULT_OCR_MIN_CONFIDENCE,
};

/// Default qdrant URL used when `TRACE_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default collection persisted chunks live in.
pub const DEFAULT_COLLECTION_NAME: &str = "trace_evidence";

/// Core configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TRACE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding uploaded sources, named `{source_id}.{ext}`.
    /// Default: `./data`.
    pub data_dir: PathBuf,

    /// Directory sampled frame JPEGs are written to. Default: `./data/frames`.
    pub frames_dir: PathBuf,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Qdrant collection name. Default: `trace_evidence`.
    pub collection: String,

    /// Per-source processing ceiling in seconds. Default: `600`.
    pub max_video_duration_secs: f64,

    /// Keyframe samples per second. Default: `0.5`.
    pub frame_sample_rate: f64,

    /// Cap on keyframes per source. Default: `30`.
    pub max_keyframes: usize,

    /// Frames wider than this are downscaled before OCR. Default: `1280`.
    pub max_frame_width: u32,

    /// OCR confidence floor; detections below it are discarded.
    /// Default: `0.3`.
    pub ocr_min_confidence: f32,

    /// Languages the OCR engine is constructed with. Default: `["en"]`.
    pub ocr_languages: Vec<String>,

    /// Whether the OCR engine should use the GPU. Default: `false`.
    pub ocr_use_gpu: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            frames_dir: PathBuf::from("./data/frames"),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            max_video_duration_secs: DEFAULT_MAX_VIDEO_DURATION_SECS,
            frame_sample_rate: DEFAULT_FRAME_SAMPLE_RATE,
            max_keyframes: DEFAULT_MAX_KEYFRAMES,
            max_frame_width: DEFAULT_MAX_FRAME_WIDTH,
            ocr_min_confidence: DEFAULT_OCR_MIN_CONFIDENCE,
            ocr_languages: vec!["en".to_string()],
            ocr_use_gpu: false,
        }
    }
}

impl Config {
    const ENV_DATA_DIR: &'static str = "TRACE_DATA_DIR";
    const ENV_FRAMES_DIR: &'static str = "TRACE_FRAMES_DIR";
    const ENV_QDRANT_URL: &'static str = "TRACE_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "TRACE_COLLECTION";
    const ENV_MAX_VIDEO_DURATION: &'static str = "TRACE_MAX_VIDEO_DURATION_SECS";
    const ENV_FRAME_SAMPLE_RATE: &'static str = "TRACE_FRAME_SAMPLE_RATE";
    const ENV_MAX_KEYFRAMES: &'static str = "TRACE_MAX_KEYFRAMES";
    const ENV_MAX_FRAME_WIDTH: &'static str = "TRACE_MAX_FRAME_WIDTH";
    const ENV_OCR_MIN_CONFIDENCE: &'static str = "TRACE_OCR_MIN_CONFIDENCE";
    const ENV_OCR_LANGUAGES: &'static str = "TRACE_OCR_LANGUAGES";
    const ENV_OCR_USE_GPU: &'static str = "TRACE_OCR_USE_GPU";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            data_dir: Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir),
            frames_dir: Self::parse_path_from_env(Self::ENV_FRAMES_DIR, defaults.frames_dir),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            max_video_duration_secs: Self::parse_f64_from_env(
                Self::ENV_MAX_VIDEO_DURATION,
                defaults.max_video_duration_secs,
            )?,
            frame_sample_rate: Self::parse_f64_from_env(
                Self::ENV_FRAME_SAMPLE_RATE,
                defaults.frame_sample_rate,
            )?,
            max_keyframes: Self::parse_usize_from_env(
                Self::ENV_MAX_KEYFRAMES,
                defaults.max_keyframes,
            )?,
            max_frame_width: Self::parse_u32_from_env(
                Self::ENV_MAX_FRAME_WIDTH,
                defaults.max_frame_width,
            )?,
            ocr_min_confidence: Self::parse_f32_from_env(
                Self::ENV_OCR_MIN_CONFIDENCE,
                defaults.ocr_min_confidence,
            )?,
            ocr_languages: Self::parse_languages_from_env(
                Self::ENV_OCR_LANGUAGES,
                defaults.ocr_languages,
            ),
            ocr_use_gpu: Self::parse_bool_from_env(Self::ENV_OCR_USE_GPU, defaults.ocr_use_gpu),
        })
    }

    /// Validates basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        if self.frames_dir.exists() && !self.frames_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.frames_dir.clone(),
            });
        }

        if !(self.frame_sample_rate.is_finite() && self.frame_sample_rate > 0.0) {
            return Err(ConfigError::NonPositiveSampleRate {
                value: self.frame_sample_rate,
            });
        }

        if !(self.max_video_duration_secs.is_finite() && self.max_video_duration_secs > 0.0) {
            return Err(ConfigError::NonPositiveDuration {
                value: self.max_video_duration_secs,
            });
        }

        if !(0.0..=1.0).contains(&self.ocr_min_confidence) {
            return Err(ConfigError::ConfidenceOutOfRange {
                value: self.ocr_min_confidence,
            });
        }

        if self.max_frame_width == 0 {
            return Err(ConfigError::ZeroFrameWidth);
        }

        if self.ocr_languages.is_empty() {
            return Err(ConfigError::NoOcrLanguages);
        }

        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_f64_from_env(var_name: &str, default: f64) -> Result<f64, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name.to_string(),
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_f32_from_env(var_name: &str, default: f32) -> Result<f32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name.to_string(),
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name.to_string(),
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_u32_from_env(var_name: &str, default: u32) -> Result<u32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name.to_string(),
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    /// Comma-separated list, e.g. `TRACE_OCR_LANGUAGES=en,de`.
    fn parse_languages_from_env(var_name: &str, default: Vec<String>) -> Vec<String> {
        match env::var(var_name) {
            Ok(value) => {
                let languages: Vec<String> = value
                    .split(',')
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                if languages.is_empty() { default } else { languages }
            }
            Err(_) => default,
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name) {
            Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            Err(_) => default,
        }
    }
}
