use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },
}
