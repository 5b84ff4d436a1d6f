//! Two-layer retrieval.
//!
//! Layer 1 pulls candidates from the vector store; Layer 2 rescores them
//! with the modality/confidence model and truncates; the orphan sweep
//! drops results whose backing files are gone. Every public entry point
//! returns an empty collection on irrecoverable failure — retrieval never
//! raises past this boundary.

pub mod scoring;
mod sweep;
pub mod types;


pub use scoring::{ScoringWeights, extraction_confidence, final_score, modality_weight};
pub use types::RankedChunk;

use std::cmp::Ordering;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::chunk::{EvidenceChunk, Modality};
use crate::config::Config;
use crate::constants::{DEFAULT_RETRIEVAL_LIMIT, RERANK_OVERSAMPLE_FACTOR};
use crate::embedding::QueryEmbedder;
use crate::store::{ChunkCandidate, EvidenceStore};

/// Retrieval-side configuration, split off [`Config`].
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Directory the orphan sweep checks source files against.
    pub data_dir: PathBuf,
    pub weights: ScoringWeights,
}

impl RetrieverConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            weights: ScoringWeights::default(),
        }
    }
}

/// Per-call retrieval options.
#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    /// Maximum results returned.
    pub limit: usize,
    /// Restrict Layer 1 to these modalities.
    pub modalities: Option<Vec<Modality>>,
    /// Whether Layer 2 reranking runs.
    pub rerank: bool,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RETRIEVAL_LIMIT,
            modalities: None,
            rerank: true,
        }
    }
}

/// Two-layer retriever over an evidence store.
pub struct Retriever<S, E> {
    store: S,
    embedder: E,
    config: RetrieverConfig,
}

impl<S: EvidenceStore, E: QueryEmbedder> Retriever<S, E> {
    pub fn new(store: S, embedder: E, config: RetrieverConfig) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the full retrieval pipeline for `query`.
    pub async fn retrieve(&self, query: &str, options: &RetrieveOptions) -> Vec<RankedChunk> {
        let vector = match self.embedder.embed_text(query) {
            Ok(vector) if !vector.is_empty() => vector,
            Ok(_) => {
                debug!("query embedded to nothing, returning no results");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "query embedding failed, returning no results");
                return Vec::new();
            }
        };

        // Layer 1: over-fetch when reranking so Layer 2 has headroom.
        let search_limit = if options.rerank {
            options.limit * RERANK_OVERSAMPLE_FACTOR
        } else {
            options.limit
        };

        let candidates = match self
            .store
            .search(vector, search_limit as u64, options.modalities.as_deref())
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "vector search failed, returning no results");
                return Vec::new();
            }
        };

        if candidates.is_empty() {
            return Vec::new();
        }

        let results = if options.rerank {
            let reranked = rerank(candidates, options.limit, &self.config.weights);
            info!(results = reranked.len(), "reranked by modality and confidence");
            reranked
        } else {
            candidates.into_iter().map(RankedChunk::unscored).collect()
        };

        sweep::sweep_orphans(&self.store, &self.config.data_dir, results).await
    }

    /// All chunks of one source. Degrades to empty on store failure.
    pub async fn by_source(&self, source_id: &str) -> Vec<EvidenceChunk> {
        match self.store.get_by_source(source_id).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(source_id, error = %e, "source lookup failed");
                Vec::new()
            }
        }
    }

    /// Chunks of one modality. Degrades to empty on store failure.
    pub async fn by_modality(&self, modality: Modality, limit: usize) -> Vec<EvidenceChunk> {
        match self.store.list_by_modality(modality, limit as u64).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(modality = %modality, error = %e, "modality scan failed");
                Vec::new()
            }
        }
    }
}

/// Layer 2: score, sort (deterministically), truncate.
pub(crate) fn rerank(
    candidates: Vec<ChunkCandidate>,
    limit: usize,
    weights: &ScoringWeights,
) -> Vec<RankedChunk> {
    let mut ranked: Vec<RankedChunk> = candidates
        .into_iter()
        .map(|candidate| {
            let score = scoring::final_score(&candidate.chunk, candidate.similarity, weights);
            debug!(
                modality = %candidate.chunk.modality,
                similarity = candidate.similarity,
                final_score = score,
                "rerank"
            );
            RankedChunk {
                id: candidate.id,
                chunk: candidate.chunk,
                similarity: candidate.similarity,
                final_score: Some(score),
            }
        })
        .collect();

    // Ties break on similarity, then point id, keeping the order stable
    // across runs.
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    ranked.truncate(limit);
    ranked
}
