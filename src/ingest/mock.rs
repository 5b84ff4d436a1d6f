//! Scripted media/OCR/ASR collaborators for tests.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};

use crate::media::{MediaContainer, MediaError, MediaOpener};

use super::audio::{SpeechTranscriber, TranscribeError, TranscriptSegment};
use super::ocr::{OcrDetection, OcrEngine, OcrError};

/// Builds [`MockMediaContainer`]s from a fixed script.
#[derive(Clone)]
pub struct MockMediaOpener {
    duration: f64,
    has_audio: bool,
    frame_size: (u32, u32),
    fail_open: bool,
    fail_frame_index: Option<usize>,
    fail_audio_extract: bool,
}

impl MockMediaOpener {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            has_audio: false,
            frame_size: (640, 360),
            fail_open: false,
            fail_frame_index: None,
            fail_audio_extract: false,
        }
    }

    pub fn with_audio(mut self) -> Self {
        self.has_audio = true;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// The container refuses to open (source-level failure).
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// The `index`-th `frame_at` call fails (frame-level failure).
    pub fn failing_frame(mut self, index: usize) -> Self {
        self.fail_frame_index = Some(index);
        self
    }

    /// Audio extraction fails even though a track is present.
    pub fn failing_audio_extract(mut self) -> Self {
        self.has_audio = true;
        self.fail_audio_extract = true;
        self
    }
}

impl MediaOpener for MockMediaOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaContainer>, MediaError> {
        if self.fail_open {
            return Err(MediaError::OpenFailed {
                path: path.display().to_string(),
                message: "mock container configured to fail".to_string(),
            });
        }

        Ok(Box::new(MockMediaContainer {
            duration: self.duration,
            has_audio: self.has_audio,
            frame_size: self.frame_size,
            fail_frame_index: self.fail_frame_index,
            fail_audio_extract: self.fail_audio_extract,
            frame_calls: 0,
        }))
    }
}

pub struct MockMediaContainer {
    duration: f64,
    has_audio: bool,
    frame_size: (u32, u32),
    fail_frame_index: Option<usize>,
    fail_audio_extract: bool,
    frame_calls: usize,
}

impl MediaContainer for MockMediaContainer {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn has_audio(&self) -> bool {
        self.has_audio
    }

    fn extract_audio(&mut self, dest: &Path, _max_duration: f64) -> Result<(), MediaError> {
        if self.fail_audio_extract {
            return Err(MediaError::AudioExtractFailed {
                message: "mock codec failure".to_string(),
            });
        }
        std::fs::write(dest, b"RIFF").map_err(MediaError::Io)
    }

    fn frame_at(&mut self, timestamp: f64) -> Result<RgbImage, MediaError> {
        let index = self.frame_calls;
        self.frame_calls += 1;

        if self.fail_frame_index == Some(index) {
            return Err(MediaError::FrameDecodeFailed {
                timestamp,
                message: "mock decode failure".to_string(),
            });
        }

        let (w, h) = self.frame_size;
        Ok(RgbImage::from_pixel(w, h, Rgb([32, 32, 32])))
    }
}

/// Pops one scripted detection batch per `read_text` call; an exhausted
/// script yields empty batches.
pub struct MockOcrEngine {
    script: Mutex<Vec<Vec<OcrDetection>>>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockOcrEngine {
    pub fn new(script: Vec<Vec<OcrDetection>>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Yields no text on any frame.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Every call errors, as a backend that never came up would.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for MockOcrEngine {
    fn read_text(&self, _frame: &RgbImage) -> Result<Vec<OcrDetection>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(OcrError::InferenceFailed {
                reason: "mock inference failure".to_string(),
            });
        }

        Ok(self
            .script
            .lock()
            .expect("mock ocr script lock poisoned")
            .pop()
            .unwrap_or_default())
    }
}

/// Returns a fixed segment list for every source.
pub struct MockTranscriber {
    segments: Vec<TranscriptSegment>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockTranscriber {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self {
            segments,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            segments: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SpeechTranscriber for MockTranscriber {
    fn transcribe(
        &self,
        _audio: &Path,
        _duration: f64,
    ) -> Result<Vec<TranscriptSegment>, TranscribeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(TranscribeError::TranscriptionFailed {
                reason: "mock ASR failure".to_string(),
            });
        }

        Ok(self.segments.clone())
    }
}
