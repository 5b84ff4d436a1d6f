//! Frame OCR extraction.
//!
//! The engine itself is an external collaborator behind [`OcrEngine`];
//! this module owns the lazy shared handle, the confidence gate, and the
//! quad → normalized-bbox geometry. OCR trouble never propagates: a frame
//! with zero regions is a valid, expected state.

use std::sync::{Arc, OnceLock};

use image::RgbImage;
use thiserror::Error;
use tracing::warn;

/// One raw detection from the OCR backend: a quadrilateral in pixel
/// coordinates, the recognized text, and the backend's confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrDetection {
    /// Corner points `[[x,y]; 4]` in pixel space, any orientation.
    pub quad: [[f32; 2]; 4],
    pub text: String,
    pub confidence: f32,
}

/// A filtered, normalized text region ready for chunk assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrRegion {
    /// Axis-aligned `[x0, y0, x1, y1]` in `[0,1]`, relative to the frame
    /// the detection came from.
    pub bbox: [f32; 4],
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Error)]
/// Errors surfaced by OCR backends.
pub enum OcrError {
    #[error("OCR backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("OCR inference failed: {reason}")]
    InferenceFailed { reason: String },
}

/// Text recognition collaborator. Instantiated once, shared read-only
/// across frames and across concurrently ingested sources.
pub trait OcrEngine: Send + Sync {
    fn read_text(&self, frame: &RgbImage) -> Result<Vec<OcrDetection>, OcrError>;
}

type OcrInit = dyn Fn() -> Result<Arc<dyn OcrEngine>, OcrError> + Send + Sync;

/// Lazily-constructed shared OCR handle.
///
/// The host supplies a constructor; the engine is built on first use and
/// reused for the process lifetime. A failed build is cached too — logged
/// once, after which every frame simply yields zero regions.
pub struct LazyOcrEngine {
    cell: OnceLock<Option<Arc<dyn OcrEngine>>>,
    init: Box<OcrInit>,
}

impl LazyOcrEngine {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn OcrEngine>, OcrError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            init: Box::new(init),
        }
    }

    /// Wraps an engine that already exists (tests, hosts that eagerly load).
    pub fn from_engine(engine: Arc<dyn OcrEngine>) -> Self {
        Self::new(move || Ok(engine.clone()))
    }

    /// The shared engine, constructing it on first call.
    pub fn get(&self) -> Option<&Arc<dyn OcrEngine>> {
        self.cell
            .get_or_init(|| match (self.init)() {
                Ok(engine) => Some(engine),
                Err(e) => {
                    warn!(error = %e, "OCR engine unavailable, frames will carry no text regions");
                    None
                }
            })
            .as_ref()
    }
}

impl std::fmt::Debug for LazyOcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.cell.get() {
            None => "uninitialized",
            Some(Some(_)) => "ready",
            Some(None) => "failed",
        };
        f.debug_struct("LazyOcrEngine").field("state", &state).finish()
    }
}

/// Runs OCR on one frame and returns filtered, normalized regions.
///
/// Engine unavailability and inference errors both degrade to an empty
/// list; the confidence gate fails closed
/// ([`OCR_CONFIDENCE_FILTER`](crate::policy::OCR_CONFIDENCE_FILTER)).
pub(crate) fn extract_regions(
    engine: &LazyOcrEngine,
    frame: &RgbImage,
    min_confidence: f32,
) -> Vec<OcrRegion> {
    let Some(engine) = engine.get() else {
        return Vec::new();
    };

    let detections = match engine.read_text(frame) {
        Ok(detections) => detections,
        Err(e) => {
            warn!(error = %e, "frame OCR failed");
            return Vec::new();
        }
    };

    let (width, height) = frame.dimensions();
    detections
        .into_iter()
        .filter_map(|d| normalize_detection(d, width, height, min_confidence))
        .collect()
}

/// Applies the text/confidence gates and reduces the quad to its
/// axis-aligned bounding box, normalized by the frame dimensions.
fn normalize_detection(
    detection: OcrDetection,
    width: u32,
    height: u32,
    min_confidence: f32,
) -> Option<OcrRegion> {
    let text = detection.text.trim();
    if text.is_empty() {
        return None;
    }

    if detection.confidence < min_confidence {
        // Fail closed: below-threshold text is discarded, not kept.
        return None;
    }

    let xs = detection.quad.map(|p| p[0]);
    let ys = detection.quad.map(|p| p[1]);
    let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
    let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
    let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let w = width as f32;
    let h = height as f32;
    let bbox = [
        (min_x / w).clamp(0.0, 1.0),
        (min_y / h).clamp(0.0, 1.0),
        (max_x / w).clamp(0.0, 1.0),
        (max_y / h).clamp(0.0, 1.0),
    ];

    Some(OcrRegion {
        bbox,
        text: text.to_string(),
        confidence: detection.confidence,
    })
}
