use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::hashing::hash_to_u64;

use super::{EmbeddingError, QueryEmbedder};

/// Deterministic embedder for tests: the vector is a pure function of the
/// input text, so equal queries always land on equal vectors.
pub struct MockQueryEmbedder {
    dim: usize,
    return_empty: bool,
    fail: bool,
}

impl MockQueryEmbedder {
    pub fn new() -> Self {
        Self {
            dim: DEFAULT_EMBEDDING_DIM,
            return_empty: false,
            fail: false,
        }
    }

    pub fn with_dim(dim: usize) -> Self {
        Self {
            dim,
            ..Self::new()
        }
    }

    /// Simulates a query that embeds to nothing.
    pub fn returning_empty() -> Self {
        Self {
            return_empty: true,
            ..Self::new()
        }
    }

    /// Simulates a broken embedding backend.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// The vector [`embed_text`](QueryEmbedder::embed_text) would produce
    /// for `text` (useful for seeding a mock store with known neighbors).
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let seed = hash_to_u64(text.as_bytes());
        (0..self.dim)
            .map(|i| {
                let mixed = seed.wrapping_mul(31).wrapping_add(i as u64) % 1000;
                mixed as f32 / 1000.0
            })
            .collect()
    }
}

impl Default for MockQueryEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEmbedder for MockQueryEmbedder {
    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder configured to fail".to_string(),
            });
        }
        if self.return_empty {
            return Ok(Vec::new());
        }
        Ok(self.vector_for(text))
    }
}
