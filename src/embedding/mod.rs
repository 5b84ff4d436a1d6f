//! Query embedding collaborator.
//!
//! How embeddings are computed is outside this crate; retrieval only needs
//! a vector per query. An empty vector is a legal answer ("nothing to
//! embed") and short-circuits retrieval to an empty result set.

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockQueryEmbedder;

/// Turns query text into a vector in the store's embedding space.
///
/// Implementations are shared read-only across concurrent queries.
pub trait QueryEmbedder: Send + Sync {
    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
