//! Layer 2 scoring: modality- and confidence-aware rescoring of vector
//! search candidates.
//!
//! Modality reliability hierarchy, most to least trustworthy: clean text
//! extraction (document/text/image_description), markdown, speech
//! transcripts, OCR, raw video frames.

use crate::chunk::{EvidenceChunk, Modality};

/// Component weights of the final score. The defaults sum to 1.0; the
/// clamp in [`final_score`] covers callers who reweight or feed
/// out-of-range inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight of the vector similarity component.
    pub vector: f32,
    /// Weight of the modality reliability component.
    pub modality: f32,
    /// Weight of the extraction confidence component.
    pub confidence: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vector: 0.5,
            modality: 0.3,
            confidence: 0.2,
        }
    }
}

/// Base reliability weight for a modality.
pub fn modality_weight(modality: Modality) -> f32 {
    match modality {
        Modality::Document | Modality::Text | Modality::ImageDescription => 1.0,
        Modality::Markdown => 0.95,
        Modality::AudioTranscript => 0.75,
        Modality::Ocr => 0.6,
        Modality::VideoFrame => 0.4,
        Modality::Unknown => 0.3,
    }
}

/// Extraction confidence for a chunk: OCR confidence when present, else
/// ASR confidence, else `1.0` — clean-text extraction is assumed reliable.
pub fn extraction_confidence(chunk: &EvidenceChunk) -> f32 {
    chunk
        .ocr_confidence
        .or(chunk.asr_confidence)
        .unwrap_or(1.0)
}

/// Combined multi-factor score, clamped into `[0,1]` from above.
pub fn final_score(chunk: &EvidenceChunk, similarity: f32, weights: &ScoringWeights) -> f32 {
    let raw = weights.vector * similarity
        + weights.modality * modality_weight(chunk.modality)
        + weights.confidence * extraction_confidence(chunk);

    raw.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_weight_hierarchy() {
        assert_eq!(modality_weight(Modality::Document), 1.0);
        assert_eq!(modality_weight(Modality::Text), 1.0);
        assert_eq!(modality_weight(Modality::ImageDescription), 1.0);
        assert_eq!(modality_weight(Modality::Markdown), 0.95);
        assert_eq!(modality_weight(Modality::AudioTranscript), 0.75);
        assert_eq!(modality_weight(Modality::Ocr), 0.6);
        assert_eq!(modality_weight(Modality::VideoFrame), 0.4);
        assert_eq!(modality_weight(Modality::Unknown), 0.3);
    }

    #[test]
    fn test_confidence_resolution_order() {
        let mut chunk = EvidenceChunk::new("a", Modality::Ocr);
        chunk.ocr_confidence = Some(0.6);
        chunk.asr_confidence = Some(0.2);
        assert_eq!(extraction_confidence(&chunk), 0.6);

        chunk.ocr_confidence = None;
        assert_eq!(extraction_confidence(&chunk), 0.2);

        chunk.asr_confidence = None;
        assert_eq!(extraction_confidence(&chunk), 1.0);
    }

    #[test]
    fn test_final_score_worked_example() {
        // 0.5·0.8 + 0.3·0.6 + 0.2·0.9 = 0.76
        let mut chunk = EvidenceChunk::new("a", Modality::Ocr);
        chunk.ocr_confidence = Some(0.9);

        let score = final_score(&chunk, 0.8, &ScoringWeights::default());
        assert!((score - 0.76).abs() < 1e-6);
    }

    #[test]
    fn test_final_score_clean_text_assumes_full_confidence() {
        // 0.5·1.0 + 0.3·1.0 + 0.2·1.0 = 1.0
        let chunk = EvidenceChunk::new("a", Modality::Document);
        let score = final_score(&chunk, 1.0, &ScoringWeights::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_final_score_clamps_to_one() {
        // similarity > 1.0 must not push the score past the ceiling.
        let chunk = EvidenceChunk::new("a", Modality::Document);
        let score = final_score(&chunk, 1.8, &ScoringWeights::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_final_score_clamps_with_reweighting() {
        let chunk = EvidenceChunk::new("a", Modality::Document);
        let weights = ScoringWeights {
            vector: 1.0,
            modality: 1.0,
            confidence: 1.0,
        };
        assert_eq!(final_score(&chunk, 0.9, &weights), 1.0);
    }
}
