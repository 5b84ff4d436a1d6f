//! Audio transcription adapter.
//!
//! Extracts the audio track (trimmed to the governed duration) into a
//! scratch WAV, hands it to the ASR collaborator, and shapes the segments
//! into `audio_transcript` chunks. A source without audio, or any
//! extraction/transcription failure, yields an empty sequence — ingestion
//! continues without audio rather than aborting.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chunk::{EvidenceChunk, Modality};
use crate::media::{MediaContainer, MediaError};

/// One transcribed span of speech.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Span start in seconds.
    pub start: f64,
    /// Span end in seconds.
    pub end: f64,
    pub text: String,
    /// Backend-reported confidence in `[0,1]`, when the backend has one.
    pub confidence: Option<f32>,
}

#[derive(Debug, Error)]
/// Errors surfaced by ASR backends.
pub enum TranscribeError {
    #[error("transcription backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("transcription failed: {reason}")]
    TranscriptionFailed { reason: String },
}

/// Speech-to-text collaborator.
///
/// Returns segments ordered by start time, covering at most
/// `[0, duration]`. Shared read-only across concurrent ingestions.
pub trait SpeechTranscriber: Send + Sync {
    fn transcribe(
        &self,
        audio: &Path,
        duration: f64,
    ) -> Result<Vec<TranscriptSegment>, TranscribeError>;
}

#[derive(Debug, Error)]
enum AudioError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transcribe(#[from] TranscribeError),

    #[error("audio scratch file error: {0}")]
    Scratch(#[from] std::io::Error),
}

/// Runs the full audio stage for one source.
pub(crate) fn transcribe_audio_track(
    container: &mut dyn MediaContainer,
    transcriber: &dyn SpeechTranscriber,
    duration: f64,
    source_id: &str,
) -> Vec<EvidenceChunk> {
    if !container.has_audio() {
        info!(source_id, "no audio track in video");
        return Vec::new();
    }

    match extract_and_transcribe(container, transcriber, duration, source_id) {
        Ok(chunks) => chunks,
        Err(e) => {
            warn!(source_id, error = %e, "audio extraction failed, continuing without audio");
            Vec::new()
        }
    }
}

fn extract_and_transcribe(
    container: &mut dyn MediaContainer,
    transcriber: &dyn SpeechTranscriber,
    duration: f64,
    source_id: &str,
) -> Result<Vec<EvidenceChunk>, AudioError> {
    let scratch = tempfile::Builder::new()
        .prefix("trace_audio_")
        .suffix(".wav")
        .tempfile()?;

    container.extract_audio(scratch.path(), duration)?;

    let segments = transcriber.transcribe(scratch.path(), duration)?;
    debug!(source_id, segments = segments.len(), "audio transcribed");

    Ok(segments
        .into_iter()
        .filter_map(|segment| segment_to_chunk(source_id, segment))
        .collect())
}

/// Shapes one segment into a chunk. The modality is always
/// `audio_transcript` — whatever the backend thinks it produced, this
/// adapter decides how it is filed.
fn segment_to_chunk(source_id: &str, segment: TranscriptSegment) -> Option<EvidenceChunk> {
    let chunk = EvidenceChunk {
        asr_confidence: segment.confidence,
        ..EvidenceChunk::new(source_id, Modality::AudioTranscript)
    }
    .with_window(segment.start, segment.end)
    .with_text(&segment.text);

    // A silent span transcribes to nothing worth keeping.
    chunk.text_content.is_some().then_some(chunk)
}
