//! Video ingestion pipeline.
//!
//! Stages, in order: duration governing, audio transcription, keyframe
//! sampling, per-frame preprocessing + OCR + temporal alignment, chunk
//! assembly. Audio must complete before any frame is processed — alignment
//! consumes the complete segment sequence, not a prefix.
//!
//! Failure handling is tiered: a container that will not open aborts the
//! source (empty output, logged once); a single bad frame is skipped; a
//! missing audio track or dead OCR backend just thins the output.

pub mod align;
pub mod audio;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod ocr;
pub mod sampler;

#[cfg(test)]
mod tests;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::chunk::{EvidenceChunk, Modality};
use crate::config::Config;
use crate::constants::{
    DEFAULT_FRAME_SAMPLE_RATE, DEFAULT_MAX_FRAME_WIDTH, DEFAULT_MAX_KEYFRAMES,
    DEFAULT_MAX_VIDEO_DURATION_SECS, DEFAULT_OCR_MIN_CONFIDENCE, FRAME_JPEG_QUALITY,
};
use crate::media::{MediaContainer, MediaError, MediaOpener};

use audio::{SpeechTranscriber, transcribe_audio_track};
use ocr::{LazyOcrEngine, OcrRegion, extract_regions};
use sampler::{downscale_frame, sample_interval, sample_timestamps};

/// Ingestion knobs, split off [`Config`] so the pipeline can be driven
/// without the store/retrieval half of the configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub frames_dir: PathBuf,
    pub max_duration_secs: f64,
    pub frame_sample_rate: f64,
    pub max_keyframes: usize,
    pub max_frame_width: u32,
    pub ocr_min_confidence: f32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("./data/frames"),
            max_duration_secs: DEFAULT_MAX_VIDEO_DURATION_SECS,
            frame_sample_rate: DEFAULT_FRAME_SAMPLE_RATE,
            max_keyframes: DEFAULT_MAX_KEYFRAMES,
            max_frame_width: DEFAULT_MAX_FRAME_WIDTH,
            ocr_min_confidence: DEFAULT_OCR_MIN_CONFIDENCE,
        }
    }
}

impl IngestConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            frames_dir: config.frames_dir.clone(),
            max_duration_secs: config.max_video_duration_secs,
            frame_sample_rate: config.frame_sample_rate,
            max_keyframes: config.max_keyframes,
            max_frame_width: config.max_frame_width,
            ocr_min_confidence: config.ocr_min_confidence,
        }
    }
}

/// Why a single frame was dropped from the output.
#[derive(Debug, Error)]
enum FrameError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("failed to encode frame image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to write frame image: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns one video source into evidence chunks.
///
/// Collaborator handles are `Arc`-shared: a single ingestor (or clones of
/// its handles) may process many sources concurrently, and the OCR engine
/// is constructed at most once across all of them.
pub struct VideoIngestor {
    opener: Arc<dyn MediaOpener>,
    transcriber: Arc<dyn SpeechTranscriber>,
    ocr: Arc<LazyOcrEngine>,
    config: IngestConfig,
}

impl VideoIngestor {
    pub fn new(
        opener: Arc<dyn MediaOpener>,
        transcriber: Arc<dyn SpeechTranscriber>,
        ocr: Arc<LazyOcrEngine>,
        config: IngestConfig,
    ) -> Self {
        Self {
            opener,
            transcriber,
            ocr,
            config,
        }
    }

    /// Runs [`ingest`](Self::ingest) on the blocking thread pool.
    ///
    /// Decode and OCR are CPU-bound; hosts serving an async runtime use
    /// this to keep them off the reactor. Sources ingested concurrently
    /// share only the collaborator handles.
    pub async fn ingest_async(self: &Arc<Self>, path: PathBuf, source_id: String) -> Vec<EvidenceChunk> {
        let ingestor = Arc::clone(self);
        tokio::task::spawn_blocking(move || ingestor.ingest(&path, &source_id))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "ingestion task panicked");
                Vec::new()
            })
    }

    /// Ingests the video at `path`.
    ///
    /// Never fails: an unreadable source yields an empty chunk list, logged
    /// once at source granularity.
    pub fn ingest(&self, path: &Path, source_id: &str) -> Vec<EvidenceChunk> {
        match self.try_ingest(path, source_id) {
            Ok(chunks) => chunks,
            Err(e) => {
                error!(source_id, error = %e, "video ingestion failed");
                Vec::new()
            }
        }
    }

    fn try_ingest(&self, path: &Path, source_id: &str) -> Result<Vec<EvidenceChunk>, MediaError> {
        info!(source_id, path = %path.display(), "processing video");

        let mut container = self.opener.open(path)?;
        fs::create_dir_all(&self.config.frames_dir)?;

        let duration = govern_duration(container.duration(), self.config.max_duration_secs);

        // Audio first, in full: alignment needs the complete sequence.
        let audio_chunks =
            transcribe_audio_track(container.as_mut(), &*self.transcriber, duration, source_id);

        let frame_chunks = self.extract_frames(container.as_mut(), source_id, duration, &audio_chunks);

        info!(
            source_id,
            audio_chunks = audio_chunks.len(),
            frame_chunks = frame_chunks.len(),
            "video processed"
        );

        let mut chunks = audio_chunks;
        chunks.extend(frame_chunks);
        Ok(chunks)
    }

    fn extract_frames(
        &self,
        container: &mut dyn MediaContainer,
        source_id: &str,
        duration: f64,
        audio_chunks: &[EvidenceChunk],
    ) -> Vec<EvidenceChunk> {
        let interval = sample_interval(self.config.frame_sample_rate);
        let times = sample_timestamps(
            duration,
            self.config.frame_sample_rate,
            self.config.max_keyframes,
        );

        info!(source_id, frames = times.len(), "extracting keyframes");

        let mut chunks = Vec::new();
        for (index, &start) in times.iter().enumerate() {
            match self.process_frame(container, source_id, index, start, interval, audio_chunks) {
                Ok(frame_chunks) => chunks.extend(frame_chunks),
                Err(e) => {
                    warn!(source_id, timestamp = start, error = %e, "skipping frame");
                }
            }
        }
        chunks
    }

    fn process_frame(
        &self,
        container: &mut dyn MediaContainer,
        source_id: &str,
        index: usize,
        start: f64,
        interval: f64,
        audio_chunks: &[EvidenceChunk],
    ) -> Result<Vec<EvidenceChunk>, FrameError> {
        let frame = container.frame_at(start)?;
        let frame = downscale_frame(frame, self.config.max_frame_width);

        let image_path = self.save_frame(&frame, source_id, index)?;

        let regions = extract_regions(&self.ocr, &frame, self.config.ocr_min_confidence);

        let end = start + interval;
        let audio_text = align::audio_text_for_window(audio_chunks, start, end);

        Ok(assemble_window_chunks(
            source_id,
            &image_path,
            start,
            end,
            regions,
            &audio_text,
        ))
    }

    fn save_frame(
        &self,
        frame: &RgbImage,
        source_id: &str,
        index: usize,
    ) -> Result<PathBuf, FrameError> {
        let path = self
            .config
            .frames_dir
            .join(format!("{source_id}_frame_{index:03}.jpg"));

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, FRAME_JPEG_QUALITY);
        frame.write_with_encoder(encoder)?;

        Ok(path)
    }
}

/// Caps processing at `max_secs`, logging when a source is truncated.
fn govern_duration(raw_secs: f64, max_secs: f64) -> f64 {
    if raw_secs > max_secs {
        warn!(
            raw_secs,
            capped_secs = max_secs,
            "video exceeds duration ceiling, truncating"
        );
        max_secs
    } else {
        raw_secs
    }
}

/// Assembles the chunks for one frame window.
///
/// No OCR regions: a single bare `video_frame` chunk (audio text attached
/// when present). Otherwise one chunk per region, text prefixed with the
/// window's aligned audio text.
fn assemble_window_chunks(
    source_id: &str,
    image_path: &Path,
    start: f64,
    end: f64,
    regions: Vec<OcrRegion>,
    audio_text: &str,
) -> Vec<EvidenceChunk> {
    let image_path = image_path.to_string_lossy().into_owned();
    let audio_text = audio_text.trim();

    let base = || {
        EvidenceChunk {
            image_path: Some(image_path.clone()),
            ..EvidenceChunk::new(source_id, Modality::VideoFrame)
        }
        .with_window(start, end)
    };

    if regions.is_empty() {
        return vec![base().with_text(audio_text)];
    }

    regions
        .into_iter()
        .map(|region| {
            let text = if audio_text.is_empty() {
                region.text
            } else {
                format!("{audio_text} {}", region.text)
            };

            EvidenceChunk {
                bbox: Some(region.bbox),
                ocr_confidence: Some(region.confidence),
                ..base()
            }
            .with_text(&text)
        })
        .collect()
}
