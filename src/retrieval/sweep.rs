//! Lazy orphan sweep.
//!
//! Runs on the read path after ranking: any result whose backing source
//! file has vanished is dropped from the response, and the source's
//! persisted chunks are deleted best-effort. Existence is checked at most
//! once per source per call.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::policy::SOURCE_EXISTENCE_CHECK;
use crate::store::EvidenceStore;

use super::types::RankedChunk;

/// Filters `results` down to those whose sources still exist on disk,
/// deleting the chunks of sources that do not.
pub(crate) async fn sweep_orphans<S: EvidenceStore>(
    store: &S,
    data_dir: &Path,
    results: Vec<RankedChunk>,
) -> Vec<RankedChunk> {
    let mut checked: HashMap<String, bool> = HashMap::new();
    let mut kept = Vec::with_capacity(results.len());

    for result in results {
        let source_id = result.chunk.source_id.as_str();

        // Results without a source pass through untouched.
        if source_id.is_empty() {
            kept.push(result);
            continue;
        }

        let present = match checked.get(source_id) {
            Some(&present) => present,
            None => {
                let present = check_source(store, data_dir, source_id).await;
                checked.insert(source_id.to_string(), present);
                present
            }
        };

        if present {
            kept.push(result);
        }
    }

    kept
}

/// One existence check, plus the delete when the source is gone.
async fn check_source<S: EvidenceStore>(store: &S, data_dir: &Path, source_id: &str) -> bool {
    let present = match source_file_exists(data_dir, source_id) {
        Ok(present) => present,
        Err(e) => {
            // Fail open: never destroy data over a flaky filesystem.
            warn!(source_id, error = %e, "source existence check failed, keeping results");
            return SOURCE_EXISTENCE_CHECK.keeps_on_error();
        }
    };

    if !present {
        warn!(source_id, "source file missing, deleting orphaned chunks");
        if let Err(e) = store.delete_source(source_id).await {
            // Best-effort: cleanup must never block serving ranked results.
            warn!(source_id, error = %e, "orphan delete failed");
        }
    }

    present
}

/// Whether some file named `{source_id}.{extension}` exists in `data_dir`.
pub(crate) fn source_file_exists(data_dir: &Path, source_id: &str) -> io::Result<bool> {
    let prefix = format!("{source_id}.");

    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            return Ok(true);
        }
    }

    Ok(false)
}
