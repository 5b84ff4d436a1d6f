//! Qdrant-backed evidence store.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, ListValue, PointId,
    PointStruct, RetrievedPoint, ScoredPoint, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use tracing::warn;

use crate::chunk::{EvidenceChunk, Modality};
use crate::config::Config;

use super::error::StoreError;
use super::{ChunkCandidate, ChunkRecord, EvidenceStore, assign_point_ids};

const SCROLL_PAGE_SIZE: u32 = 256;

#[derive(Clone)]
/// Evidence store over a qdrant collection (cosine distance).
pub struct QdrantEvidenceStore {
    client: Qdrant,
    collection: String,
}

impl QdrantEvidenceStore {
    /// Connects a client for `url`, persisting into `collection`.
    pub async fn new(url: &str, collection: impl Into<String>) -> Result<Self, StoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| StoreError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            collection: collection.into(),
        })
    }

    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(&config.qdrant_url, config.collection.clone()).await
    }

    /// Returns the configured collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Ensures the collection exists (creates it with cosine distance if
    /// missing).
    pub async fn ensure_collection(&self, vector_size: u64) -> Result<(), StoreError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| StoreError::CreateCollectionFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        if !exists {
            let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(vectors_config)
                        .on_disk_payload(true),
                )
                .await
                .map_err(|e| StoreError::CreateCollectionFailed {
                    collection: self.collection.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    async fn upsert_chunks_impl(&self, records: Vec<ChunkRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let ids = assign_point_ids(&records);
        let points: Vec<PointStruct> = records
            .into_iter()
            .zip(ids)
            .map(|(record, id)| {
                PointStruct::new(id, record.vector, chunk_to_payload(&record.chunk))
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| StoreError::UpsertFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn search_impl(
        &self,
        query: Vec<f32>,
        limit: u64,
        modalities: Option<&[Modality]>,
    ) -> Result<Vec<ChunkCandidate>, StoreError> {
        let mut search_builder =
            SearchPointsBuilder::new(&self.collection, query, limit).with_payload(true);

        if let Some(filter) = modality_filter(modalities) {
            search_builder = search_builder.filter(filter);
        }

        let response = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| StoreError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .into_iter()
            .filter_map(candidate_from_scored_point)
            .collect())
    }

    async fn scroll_chunks(&self, filter: Filter, limit: Option<u64>) -> Result<Vec<EvidenceChunk>, StoreError> {
        let mut chunks = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let page_size = match limit {
                Some(limit) => (limit - chunks.len() as u64).min(SCROLL_PAGE_SIZE as u64) as u32,
                None => SCROLL_PAGE_SIZE,
            };
            if page_size == 0 {
                break;
            }

            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .filter(filter.clone())
                .limit(page_size)
                .with_payload(true);
            if let Some(page_offset) = offset.take() {
                builder = builder.offset(page_offset);
            }

            let response =
                self.client
                    .scroll(builder)
                    .await
                    .map_err(|e| StoreError::ScanFailed {
                        collection: self.collection.clone(),
                        message: e.to_string(),
                    })?;

            chunks.extend(
                response
                    .result
                    .iter()
                    .filter_map(chunk_from_retrieved_point),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        if let Some(limit) = limit {
            chunks.truncate(limit as usize);
        }
        Ok(chunks)
    }

    async fn get_by_source_impl(&self, source_id: &str) -> Result<Vec<EvidenceChunk>, StoreError> {
        let filter = Filter::must([Condition::matches("source_id", source_id.to_string())]);
        self.scroll_chunks(filter, None).await
    }

    async fn delete_source_impl(&self, source_id: &str) -> Result<(), StoreError> {
        let filter = Filter::must([Condition::matches("source_id", source_id.to_string())]);

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(filter)
                    .wait(true),
            )
            .await
            .map_err(|e| StoreError::DeleteFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn list_by_modality_impl(
        &self,
        modality: Modality,
        limit: u64,
    ) -> Result<Vec<EvidenceChunk>, StoreError> {
        // The filter value is the enum's canonical keyword, never caller
        // text, so nothing here can smuggle quotes into the scan.
        let filter = Filter::must([Condition::matches(
            "modality",
            modality.as_str().to_string(),
        )]);
        self.scroll_chunks(filter, Some(limit)).await
    }
}

impl EvidenceStore for QdrantEvidenceStore {
    async fn upsert_chunks(&self, records: Vec<ChunkRecord>) -> Result<(), StoreError> {
        self.upsert_chunks_impl(records).await
    }

    async fn search(
        &self,
        query: Vec<f32>,
        limit: u64,
        modalities: Option<&[Modality]>,
    ) -> Result<Vec<ChunkCandidate>, StoreError> {
        self.search_impl(query, limit, modalities).await
    }

    async fn get_by_source(&self, source_id: &str) -> Result<Vec<EvidenceChunk>, StoreError> {
        self.get_by_source_impl(source_id).await
    }

    async fn delete_source(&self, source_id: &str) -> Result<(), StoreError> {
        self.delete_source_impl(source_id).await
    }

    async fn list_by_modality(
        &self,
        modality: Modality,
        limit: u64,
    ) -> Result<Vec<EvidenceChunk>, StoreError> {
        self.list_by_modality_impl(modality, limit).await
    }
}

/// Any-of filter over the canonical modality keywords.
fn modality_filter(modalities: Option<&[Modality]>) -> Option<Filter> {
    let modalities = modalities?;
    if modalities.is_empty() {
        return None;
    }

    let conditions: Vec<Condition> = modalities
        .iter()
        .map(|m| Condition::matches("modality", m.as_str().to_string()))
        .collect();
    Some(Filter::should(conditions))
}

/// Encodes a chunk as a payload map. Absent optionals are left out of the
/// map entirely, matching the wire contract.
pub(crate) fn chunk_to_payload(chunk: &EvidenceChunk) -> HashMap<String, Value> {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert("source_id".to_string(), chunk.source_id.clone().into());
    payload.insert(
        "modality".to_string(),
        chunk.modality.as_str().to_string().into(),
    );

    if let Some(start) = chunk.timestamp_start {
        payload.insert("timestamp_start".to_string(), start.into());
    }
    if let Some(end) = chunk.timestamp_end {
        payload.insert("timestamp_end".to_string(), end.into());
    }
    if let Some(ref text) = chunk.text_content {
        payload.insert("text_content".to_string(), text.clone().into());
    }
    if let Some(ref path) = chunk.image_path {
        payload.insert("image_path".to_string(), path.clone().into());
    }
    if let Some(bbox) = chunk.bbox {
        let values = bbox.iter().map(|&v| Value::from(v as f64)).collect();
        payload.insert(
            "bbox".to_string(),
            Value {
                kind: Some(Kind::ListValue(ListValue { values })),
            },
        );
    }
    if let Some(confidence) = chunk.ocr_confidence {
        payload.insert("ocr_confidence".to_string(), (confidence as f64).into());
    }
    if let Some(confidence) = chunk.asr_confidence {
        payload.insert("asr_confidence".to_string(), (confidence as f64).into());
    }

    payload
}

/// Decodes a payload map back into a chunk. `None` on a map missing the
/// mandatory fields; callers drop (and log) such points.
pub(crate) fn chunk_from_payload(payload: &HashMap<String, Value>) -> Option<EvidenceChunk> {
    let source_id = value_as_str(payload.get("source_id")?)?.to_string();
    let modality = Modality::parse(value_as_str(payload.get("modality")?)?);

    Some(EvidenceChunk {
        source_id,
        modality,
        timestamp_start: payload.get("timestamp_start").and_then(value_as_f64),
        timestamp_end: payload.get("timestamp_end").and_then(value_as_f64),
        text_content: payload
            .get("text_content")
            .and_then(value_as_str)
            .map(str::to_string),
        image_path: payload
            .get("image_path")
            .and_then(value_as_str)
            .map(str::to_string),
        bbox: payload.get("bbox").and_then(value_as_bbox),
        ocr_confidence: payload
            .get("ocr_confidence")
            .and_then(value_as_f64)
            .map(|v| v as f32),
        asr_confidence: payload
            .get("asr_confidence")
            .and_then(value_as_f64)
            .map(|v| v as f32),
    })
}

fn candidate_from_scored_point(point: ScoredPoint) -> Option<ChunkCandidate> {
    let id = match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(n)) => n,
        _ => return None,
    };

    let Some(chunk) = chunk_from_payload(&point.payload) else {
        warn!(point_id = id, "dropping search hit with malformed payload");
        return None;
    };

    Some(ChunkCandidate::new(id, chunk, Some(point.score)))
}

fn chunk_from_retrieved_point(point: &RetrievedPoint) -> Option<EvidenceChunk> {
    let chunk = chunk_from_payload(&point.payload);
    if chunk.is_none() {
        warn!("dropping stored point with malformed payload");
    }
    chunk
}

fn value_as_str(value: &Value) -> Option<&str> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value.kind {
        Some(Kind::DoubleValue(d)) => Some(d),
        Some(Kind::IntegerValue(i)) => Some(i as f64),
        _ => None,
    }
}

fn value_as_bbox(value: &Value) -> Option<[f32; 4]> {
    let values = match &value.kind {
        Some(Kind::ListValue(list)) => &list.values,
        _ => return None,
    };
    if values.len() != 4 {
        return None;
    }

    let mut bbox = [0.0f32; 4];
    for (slot, value) in bbox.iter_mut().zip(values.iter()) {
        *slot = value_as_f64(value)? as f32;
    }
    Some(bbox)
}
