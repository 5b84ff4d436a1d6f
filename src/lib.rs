//! Trace evidence core (used by the API host and integration tests).
//!
//! Two coupled halves share one data model:
//!
//! - **Ingestion** ([`ingest`]) turns a video source into time-aligned,
//!   confidence-scored [`EvidenceChunk`]s: governed duration, transcribed
//!   audio, sampled keyframes, OCR regions fused with overlapping speech.
//! - **Retrieval** ([`retrieval`]) runs two-layer search over the store:
//!   vector candidates, modality/confidence reranking, and a lazy orphan
//!   sweep for sources whose backing files are gone.
//!
//! # Public API Surface
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`EvidenceChunk`], [`Modality`] - Persisted wire shape
//! - [`VideoIngestor`], [`IngestConfig`] - Ingestion pipeline
//! - [`Retriever`], [`RetrieveOptions`], [`RankedChunk`] - Retrieval
//!
//! ## Collaborator Interfaces
//! External engines are injected behind capability traits:
//! [`MediaOpener`]/[`MediaContainer`], [`OcrEngine`] (via
//! [`LazyOcrEngine`]), [`SpeechTranscriber`], [`QueryEmbedder`], and
//! [`EvidenceStore`] (qdrant implementation included).
//!
//! ## Error Policy
//! Public pipeline entry points never raise: failures degrade to empty
//! output, per the named constants in [`policy`].
//!
//! ## Test/Mock Support
//! Mock collaborators are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod chunk;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod hashing;
pub mod ingest;
pub mod media;
pub mod policy;
pub mod retrieval;
pub mod store;

pub use chunk::{ChunkError, EvidenceChunk, Modality};
pub use config::{Config, ConfigError};
pub use embedding::{EmbeddingError, QueryEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockQueryEmbedder;
pub use hashing::{chunk_point_id, hash_to_u64};
pub use media::{MediaContainer, MediaError, MediaOpener};
pub use policy::{
    FailurePolicy, OCR_CONFIDENCE_FILTER, ORPHAN_DELETE, SOURCE_EXISTENCE_CHECK,
};

pub use ingest::audio::{SpeechTranscriber, TranscribeError, TranscriptSegment};
pub use ingest::ocr::{LazyOcrEngine, OcrDetection, OcrEngine, OcrError, OcrRegion};
pub use ingest::sampler::{downscale_dimensions, sample_interval, sample_timestamps};
pub use ingest::{IngestConfig, VideoIngestor};
#[cfg(any(test, feature = "mock"))]
pub use ingest::mock::{MockMediaOpener, MockOcrEngine, MockTranscriber};

pub use retrieval::{
    RankedChunk, RetrieveOptions, Retriever, RetrieverConfig, ScoringWeights,
    extraction_confidence, final_score, modality_weight,
};

pub use store::{ChunkCandidate, ChunkRecord, EvidenceStore, QdrantEvidenceStore, StoreError};
#[cfg(any(test, feature = "mock"))]
pub use store::{MockEvidenceStore, cosine_similarity};
