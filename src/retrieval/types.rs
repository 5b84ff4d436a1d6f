use crate::chunk::EvidenceChunk;
use crate::store::ChunkCandidate;

/// A retrieval result: a stored chunk with its query-time scores.
///
/// Both scores are transient — they exist only in this response and are
/// never written back to the store. `final_score` is absent when Layer 2
/// reranking was disabled for the call.
#[derive(Debug, Clone)]
pub struct RankedChunk {
    /// Stable point id of the stored chunk.
    pub id: u64,
    pub chunk: EvidenceChunk,
    /// Layer 1 vector similarity.
    pub similarity: f32,
    /// Layer 2 combined score, when reranking ran.
    pub final_score: Option<f32>,
}

impl RankedChunk {
    /// Wraps a Layer 1 candidate that skipped reranking.
    pub fn unscored(candidate: ChunkCandidate) -> Self {
        Self {
            id: candidate.id,
            chunk: candidate.chunk,
            similarity: candidate.similarity,
            final_score: None,
        }
    }

    /// How much Layer 2 moved this result relative to raw similarity.
    pub fn score_delta(&self) -> Option<f32> {
        self.final_score.map(|score| score - self.similarity)
    }
}
