//! Named failure policies for the pipeline's degrade paths.
//!
//! Every class of uncertain failure resolves the same question: keep the
//! data or drop it? The answer is a per-class constant here rather than an
//! ad hoc branch at each call site, so tests can assert the policy itself.

/// What to do with data when a check over it fails or cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Assume validity: keep the data.
    FailOpen,
    /// Assume invalidity: discard the data.
    FailClosed,
}

impl FailurePolicy {
    /// Returns `true` if data survives an inconclusive check.
    pub fn keeps_on_error(self) -> bool {
        matches!(self, FailurePolicy::FailOpen)
    }
}

/// Source existence checks fail open: a transient filesystem error must
/// never trigger destructive cleanup of persisted chunks.
pub const SOURCE_EXISTENCE_CHECK: FailurePolicy = FailurePolicy::FailOpen;

/// Confidence gating fails closed: low-confidence OCR text is actively
/// misleading, so below-threshold detections are discarded.
pub const OCR_CONFIDENCE_FILTER: FailurePolicy = FailurePolicy::FailClosed;

/// Orphan deletion is best-effort: a failed delete is logged and the
/// already-ranked results are served anyway.
pub const ORPHAN_DELETE: FailurePolicy = FailurePolicy::FailOpen;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_check_fails_open() {
        assert_eq!(SOURCE_EXISTENCE_CHECK, FailurePolicy::FailOpen);
        assert!(SOURCE_EXISTENCE_CHECK.keeps_on_error());
    }

    #[test]
    fn test_confidence_filter_fails_closed() {
        assert_eq!(OCR_CONFIDENCE_FILTER, FailurePolicy::FailClosed);
        assert!(!OCR_CONFIDENCE_FILTER.keeps_on_error());
    }

    #[test]
    fn test_orphan_delete_fails_open() {
        assert_eq!(ORPHAN_DELETE, FailurePolicy::FailOpen);
    }
}
