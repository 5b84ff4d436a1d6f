//! The evidence chunk data model.
//!
//! [`EvidenceChunk`] is the unit persisted by ingestion and returned by
//! retrieval — the wire contract between the two halves of the crate.
//! Transient query-time scores do NOT live here; see
//! [`ChunkCandidate`](crate::store::ChunkCandidate) and
//! [`RankedChunk`](crate::retrieval::RankedChunk).


use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Extraction method / source type of a chunk.
///
/// Unrecognized wire strings deserialize to [`Modality::Unknown`] rather
/// than failing: a store may hold chunks written by newer ingesters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Document,
    Text,
    Markdown,
    ImageDescription,
    Ocr,
    AudioTranscript,
    VideoFrame,
    Unknown,
}

impl<'de> Deserialize<'de> for Modality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Modality::parse(&value))
    }
}

impl Modality {
    /// Canonical wire string. Filters against the store are built from
    /// this value, never from caller-supplied text, so quoting is a
    /// non-issue by construction.
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Document => "document",
            Modality::Text => "text",
            Modality::Markdown => "markdown",
            Modality::ImageDescription => "image_description",
            Modality::Ocr => "ocr",
            Modality::AudioTranscript => "audio_transcript",
            Modality::VideoFrame => "video_frame",
            Modality::Unknown => "unknown",
        }
    }

    /// Parses a wire string; anything unrecognized is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value {
            "document" => Modality::Document,
            "text" => Modality::Text,
            "markdown" => Modality::Markdown,
            "image_description" => Modality::ImageDescription,
            "ocr" => Modality::Ocr,
            "audio_transcript" => Modality::AudioTranscript,
            "video_frame" => Modality::VideoFrame,
            _ => Modality::Unknown,
        }
    }

    /// Temporal modalities require both timestamps.
    pub fn is_temporal(self) -> bool {
        matches!(self, Modality::AudioTranscript | Modality::VideoFrame)
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
/// Violations of the chunk invariants checked by [`EvidenceChunk::validate`].
pub enum ChunkError {
    /// `timestamp_end` precedes `timestamp_start`.
    #[error("timestamp_end {end} precedes timestamp_start {start}")]
    InvertedTimestamps { start: f64, end: f64 },

    /// A temporal modality is missing one or both timestamps.
    #[error("modality '{modality}' requires both timestamps")]
    MissingTimestamps { modality: Modality },

    /// Bbox coordinates are outside `[0,1]` or inverted.
    #[error("bbox {bbox:?} is not a normalized, ordered rectangle")]
    InvalidBbox { bbox: [f32; 4] },

    /// `text_content` is present but empty or untrimmed.
    #[error("text_content must be trimmed and non-empty when present")]
    BlankText,
}

/// A single piece of extracted evidence.
///
/// Optional fields are omitted from the wire payload entirely when absent
/// — an absent `text_content` is semantically distinct from an empty one,
/// and the store never sees empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChunk {
    /// Identifier of the originating media/document.
    pub source_id: String,

    pub modality: Modality,

    /// Window start in seconds. Required for temporal modalities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_start: Option<f64>,

    /// Window end in seconds. `timestamp_end >= timestamp_start` when both
    /// are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_end: Option<f64>,

    /// Trimmed, non-empty extracted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Saved frame image; only set for `video_frame` chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Axis-aligned `[x0, y0, x1, y1]`, normalized to `[0,1]` relative to
    /// the (post-resize) frame dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asr_confidence: Option<f32>,
}

impl EvidenceChunk {
    /// A chunk with nothing but identity; callers fill in the rest.
    pub fn new(source_id: impl Into<String>, modality: Modality) -> Self {
        Self {
            source_id: source_id.into(),
            modality,
            timestamp_start: None,
            timestamp_end: None,
            text_content: None,
            image_path: None,
            bbox: None,
            ocr_confidence: None,
            asr_confidence: None,
        }
    }

    /// Sets `text_content` iff `text` trims to something non-empty.
    ///
    /// This is the only way pipeline code attaches text, so the
    /// trimmed/non-empty invariant holds everywhere by construction.
    pub fn with_text(mut self, text: &str) -> Self {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.text_content = Some(trimmed.to_string());
        }
        self
    }

    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.timestamp_start = Some(start);
        self.timestamp_end = Some(end);
        self
    }

    /// Checks the invariants of §the wire contract. Pipeline output is
    /// correct by construction; this exists for store boundaries and tests.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if let (Some(start), Some(end)) = (self.timestamp_start, self.timestamp_end)
            && end < start
        {
            return Err(ChunkError::InvertedTimestamps { start, end });
        }

        if self.modality.is_temporal()
            && (self.timestamp_start.is_none() || self.timestamp_end.is_none())
        {
            return Err(ChunkError::MissingTimestamps {
                modality: self.modality,
            });
        }

        if let Some(bbox) = self.bbox {
            let [x0, y0, x1, y1] = bbox;
            let ordered = x0 <= x1 && y0 <= y1;
            let in_range = bbox.iter().all(|v| (0.0..=1.0).contains(v));
            if !ordered || !in_range {
                return Err(ChunkError::InvalidBbox { bbox });
            }
        }

        if let Some(ref text) = self.text_content
            && (text.is_empty() || text.trim().len() != text.len())
        {
            return Err(ChunkError::BlankText);
        }

        Ok(())
    }
}
