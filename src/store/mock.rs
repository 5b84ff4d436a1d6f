//! In-memory evidence store for tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::chunk::{EvidenceChunk, Modality};

use super::error::StoreError;
use super::{ChunkCandidate, ChunkRecord, EvidenceStore, assign_point_ids};

#[derive(Default)]
pub struct MockEvidenceStore {
    points: RwLock<BTreeMap<u64, ChunkRecord>>,
    delete_calls: RwLock<Vec<String>>,
    last_search_limit: RwLock<Option<u64>>,
    omit_similarity: bool,
    fail_delete: bool,
    fail_search: bool,
}

impl MockEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every search errors, as an unreachable backend would.
    pub fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Self::default()
        }
    }

    /// Deletes error after being recorded.
    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    /// Candidates come back without a similarity, exercising the default.
    pub fn omitting_similarity() -> Self {
        Self {
            omit_similarity: true,
            ..Self::default()
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.points.read().expect("mock store lock poisoned").len()
    }

    /// Every `delete_source` invocation, in order, including failed ones.
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls
            .read()
            .expect("mock store lock poisoned")
            .clone()
    }

    /// The limit passed to the most recent `search`.
    pub fn last_search_limit(&self) -> Option<u64> {
        *self
            .last_search_limit
            .read()
            .expect("mock store lock poisoned")
    }
}

impl EvidenceStore for MockEvidenceStore {
    async fn upsert_chunks(&self, records: Vec<ChunkRecord>) -> Result<(), StoreError> {
        let ids = assign_point_ids(&records);
        let mut points = self.points.write().expect("mock store lock poisoned");
        for (record, id) in records.into_iter().zip(ids) {
            points.insert(id, record);
        }
        Ok(())
    }

    async fn search(
        &self,
        query: Vec<f32>,
        limit: u64,
        modalities: Option<&[Modality]>,
    ) -> Result<Vec<ChunkCandidate>, StoreError> {
        *self
            .last_search_limit
            .write()
            .expect("mock store lock poisoned") = Some(limit);

        if self.fail_search {
            return Err(StoreError::SearchFailed {
                collection: "mock".to_string(),
                message: "mock store configured to fail".to_string(),
            });
        }

        let points = self.points.read().expect("mock store lock poisoned");
        let mut candidates: Vec<ChunkCandidate> = points
            .iter()
            .filter(|(_, record)| {
                modalities.is_none_or(|filter| filter.contains(&record.chunk.modality))
            })
            .map(|(&id, record)| {
                let similarity = (!self.omit_similarity)
                    .then(|| cosine_similarity(&query, &record.vector));
                ChunkCandidate::new(id, record.chunk.clone(), similarity)
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        candidates.truncate(limit as usize);
        Ok(candidates)
    }

    async fn get_by_source(&self, source_id: &str) -> Result<Vec<EvidenceChunk>, StoreError> {
        let points = self.points.read().expect("mock store lock poisoned");
        Ok(points
            .values()
            .filter(|record| record.chunk.source_id == source_id)
            .map(|record| record.chunk.clone())
            .collect())
    }

    async fn delete_source(&self, source_id: &str) -> Result<(), StoreError> {
        self.delete_calls
            .write()
            .expect("mock store lock poisoned")
            .push(source_id.to_string());

        if self.fail_delete {
            return Err(StoreError::DeleteFailed {
                collection: "mock".to_string(),
                message: "mock store configured to fail".to_string(),
            });
        }

        let mut points = self.points.write().expect("mock store lock poisoned");
        points.retain(|_, record| record.chunk.source_id != source_id);
        Ok(())
    }

    async fn list_by_modality(
        &self,
        modality: Modality,
        limit: u64,
    ) -> Result<Vec<EvidenceChunk>, StoreError> {
        let points = self.points.read().expect("mock store lock poisoned");
        Ok(points
            .values()
            .filter(|record| record.chunk.modality == modality)
            .take(limit as usize)
            .map(|record| record.chunk.clone())
            .collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
