//! Evidence store abstraction.
//!
//! The store owns persisted chunks; ingestion appends, retrieval reads,
//! and the orphan sweeper deletes per source. Filters are built from
//! typed values ([`Modality`], structured match conditions) — caller text
//! never reaches a query string.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod qdrant;


pub use error::StoreError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEvidenceStore, cosine_similarity};
pub use qdrant::QdrantEvidenceStore;

use std::collections::HashMap;

use crate::chunk::{EvidenceChunk, Modality};
use crate::constants::DEFAULT_SIMILARITY;
use crate::hashing::chunk_point_id;

/// A chunk paired with the vector it is indexed under.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub chunk: EvidenceChunk,
    pub vector: Vec<f32>,
}

/// A Layer 1 candidate: a stored chunk plus its query similarity.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    /// Stable point id of the stored chunk.
    pub id: u64,
    pub chunk: EvidenceChunk,
    /// Similarity reported by the store, in `[0,1]`.
    pub similarity: f32,
}

impl ChunkCandidate {
    /// Builds a candidate, defaulting the similarity when the store has
    /// none for this entry.
    pub fn new(id: u64, chunk: EvidenceChunk, similarity: Option<f32>) -> Self {
        Self {
            id,
            chunk,
            similarity: similarity.unwrap_or(DEFAULT_SIMILARITY),
        }
    }
}

/// Stable point ids for a batch of records: chunks are numbered per
/// source in batch order, so re-ingesting a source overwrites its own
/// points instead of duplicating them.
pub(crate) fn assign_point_ids(records: &[ChunkRecord]) -> Vec<u64> {
    let mut per_source: HashMap<&str, usize> = HashMap::new();
    records
        .iter()
        .map(|record| {
            let index = per_source
                .entry(record.chunk.source_id.as_str())
                .or_insert(0);
            let id = chunk_point_id(&record.chunk.source_id, *index);
            *index += 1;
            id
        })
        .collect()
}

/// Async evidence store interface used by ingestion and retrieval.
pub trait EvidenceStore: Send + Sync {
    /// Appends a source's chunks (with their embedding vectors).
    fn upsert_chunks(
        &self,
        records: Vec<ChunkRecord>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Vector similarity search with an optional modality filter.
    fn search(
        &self,
        query: Vec<f32>,
        limit: u64,
        modalities: Option<&[Modality]>,
    ) -> impl std::future::Future<Output = Result<Vec<ChunkCandidate>, StoreError>> + Send;

    /// All chunks belonging to one source.
    fn get_by_source(
        &self,
        source_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<EvidenceChunk>, StoreError>> + Send;

    /// Deletes every chunk of `source_id`. Idempotent: deleting an absent
    /// source succeeds.
    fn delete_source(
        &self,
        source_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Scan by exact modality match.
    fn list_by_modality(
        &self,
        modality: Modality,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<EvidenceChunk>, StoreError>> + Send;
}
