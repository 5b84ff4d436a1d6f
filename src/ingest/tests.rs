use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::mock::{MockMediaOpener, MockOcrEngine, MockTranscriber};
use super::ocr::{LazyOcrEngine, OcrDetection, OcrRegion};
use super::*;
use crate::chunk::Modality;
use crate::ingest::audio::TranscriptSegment;

fn test_config(frames_dir: &Path) -> IngestConfig {
    IngestConfig {
        frames_dir: frames_dir.to_path_buf(),
        max_duration_secs: 600.0,
        frame_sample_rate: 0.5,
        max_keyframes: 30,
        max_frame_width: 1280,
        ocr_min_confidence: 0.3,
    }
}

fn ingestor(
    opener: MockMediaOpener,
    transcriber: MockTranscriber,
    ocr: MockOcrEngine,
    frames_dir: &Path,
) -> VideoIngestor {
    VideoIngestor::new(
        Arc::new(opener),
        Arc::new(transcriber),
        Arc::new(LazyOcrEngine::from_engine(Arc::new(ocr))),
        test_config(frames_dir),
    )
}

fn segment(start: f64, end: f64, text: &str) -> TranscriptSegment {
    TranscriptSegment {
        start,
        end,
        text: text.to_string(),
        confidence: Some(0.9),
    }
}

fn detection(quad: [[f32; 2]; 4], text: &str, confidence: f32) -> OcrDetection {
    OcrDetection {
        quad,
        text: text.to_string(),
        confidence,
    }
}

#[test]
fn test_silent_video_without_ocr_yields_bare_frame_chunks() {
    let dir = tempfile::tempdir().unwrap();
    // 10s at 0.5 samples/sec → windows at 0,2,4,6,8.
    let ingestor = ingestor(
        MockMediaOpener::new(10.0),
        MockTranscriber::new(Vec::new()),
        MockOcrEngine::empty(),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    assert_eq!(chunks.len(), 5);
    for chunk in &chunks {
        assert_eq!(chunk.modality, Modality::VideoFrame);
        assert_eq!(chunk.text_content, None);
        assert!(chunk.image_path.is_some());
        assert!(chunk.validate().is_ok());
    }
    assert_eq!(chunks[0].timestamp_start, Some(0.0));
    assert_eq!(chunks[0].timestamp_end, Some(2.0));
    assert_eq!(chunks[4].timestamp_start, Some(8.0));
}

#[test]
fn test_audio_chunks_precede_frame_chunks_and_are_force_tagged() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor(
        MockMediaOpener::new(4.0).with_audio(),
        MockTranscriber::new(vec![segment(0.0, 1.5, "hello world")]),
        MockOcrEngine::empty(),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    // 1 audio chunk + 2 frame windows (0, 2).
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].modality, Modality::AudioTranscript);
    assert_eq!(chunks[0].text_content.as_deref(), Some("hello world"));
    assert_eq!(chunks[0].asr_confidence, Some(0.9));
    assert_eq!(chunks[1].modality, Modality::VideoFrame);
}

#[test]
fn test_aligned_audio_text_lands_on_overlapping_windows() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor(
        MockMediaOpener::new(6.0).with_audio(),
        MockTranscriber::new(vec![segment(2.5, 3.5, "mid speech")]),
        MockOcrEngine::empty(),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");
    let frames: Vec<_> = chunks
        .iter()
        .filter(|c| c.modality == Modality::VideoFrame)
        .collect();

    // Windows [0,2), [2,4), [4,6): only [2,4) overlaps the segment.
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].text_content, None);
    assert_eq!(frames[1].text_content.as_deref(), Some("mid speech"));
    assert_eq!(frames[2].text_content, None);
}

#[test]
fn test_ocr_regions_fan_out_into_chunks_with_audio_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let quad_a = [[64.0, 36.0], [128.0, 36.0], [128.0, 72.0], [64.0, 72.0]];
    let quad_b = [[320.0, 180.0], [480.0, 180.0], [480.0, 270.0], [320.0, 270.0]];
    let ingestor = ingestor(
        MockMediaOpener::new(2.0).with_audio().with_frame_size(640, 360),
        MockTranscriber::new(vec![segment(0.0, 2.0, "voice over")]),
        MockOcrEngine::new(vec![vec![
            detection(quad_a, "SALE", 0.95),
            detection(quad_b, "50% OFF", 0.8),
        ]]),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");
    let frames: Vec<_> = chunks
        .iter()
        .filter(|c| c.modality == Modality::VideoFrame)
        .collect();

    assert_eq!(frames.len(), 2);

    // Audio text prefixes each region's text.
    assert_eq!(frames[0].text_content.as_deref(), Some("voice over SALE"));
    assert_eq!(frames[1].text_content.as_deref(), Some("voice over 50% OFF"));

    let bbox = frames[0].bbox.unwrap();
    assert!((bbox[0] - 0.1).abs() < 1e-6);
    assert!((bbox[1] - 0.1).abs() < 1e-6);
    assert!((bbox[2] - 0.2).abs() < 1e-6);
    assert!((bbox[3] - 0.2).abs() < 1e-6);
    assert_eq!(frames[0].ocr_confidence, Some(0.95));
}

#[test]
fn test_bbox_normalized_against_post_resize_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    // 2560x1440 downscales to 1280x720; the mock engine sees the resized
    // frame, so quads are in resized pixel space.
    let quad = [[128.0, 72.0], [256.0, 72.0], [256.0, 144.0], [128.0, 144.0]];
    let ingestor = ingestor(
        MockMediaOpener::new(2.0).with_frame_size(2560, 1440),
        MockTranscriber::new(Vec::new()),
        MockOcrEngine::new(vec![vec![detection(quad, "HUD", 0.9)]]),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    let bbox = chunks[0].bbox.unwrap();
    assert!((bbox[0] - 0.1).abs() < 1e-6);
    assert!((bbox[1] - 0.1).abs() < 1e-6);
    assert!((bbox[2] - 0.2).abs() < 1e-6);
    assert!((bbox[3] - 0.2).abs() < 1e-6);
}

#[test]
fn test_failed_frame_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor(
        MockMediaOpener::new(6.0).failing_frame(1),
        MockTranscriber::new(Vec::new()),
        MockOcrEngine::empty(),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    // Window at 2s is lost; 0s and 4s survive.
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].timestamp_start, Some(0.0));
    assert_eq!(chunks[1].timestamp_start, Some(4.0));
}

#[test]
fn test_unopenable_container_yields_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor(
        MockMediaOpener::new(10.0).failing_open(),
        MockTranscriber::new(Vec::new()),
        MockOcrEngine::empty(),
        dir.path(),
    );

    assert!(ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1").is_empty());
}

#[test]
fn test_audio_extraction_failure_degrades_to_frames_only() {
    let dir = tempfile::tempdir().unwrap();
    let transcriber = MockTranscriber::new(vec![segment(0.0, 1.0, "never seen")]);
    let ingestor = ingestor(
        MockMediaOpener::new(4.0).failing_audio_extract(),
        transcriber,
        MockOcrEngine::empty(),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.modality == Modality::VideoFrame));
}

#[test]
fn test_failing_ocr_backend_degrades_to_bare_frames() {
    let dir = tempfile::tempdir().unwrap();
    let ingestor = ingestor(
        MockMediaOpener::new(2.0),
        MockTranscriber::new(Vec::new()),
        MockOcrEngine::failing(),
        dir.path(),
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].modality, Modality::VideoFrame);
    assert_eq!(chunks[0].bbox, None);
}

#[test]
fn test_duration_governor_caps_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.max_duration_secs = 4.0;

    let ingestor = VideoIngestor::new(
        Arc::new(MockMediaOpener::new(100.0)),
        Arc::new(MockTranscriber::new(Vec::new())),
        Arc::new(LazyOcrEngine::from_engine(Arc::new(MockOcrEngine::empty()))),
        config,
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    // Governed to 4s → windows at 0 and 2 only.
    assert_eq!(chunks.len(), 2);
}

#[test]
fn test_keyframe_cap_bounds_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.max_keyframes = 3;

    let ingestor = VideoIngestor::new(
        Arc::new(MockMediaOpener::new(100.0)),
        Arc::new(MockTranscriber::new(Vec::new())),
        Arc::new(LazyOcrEngine::from_engine(Arc::new(MockOcrEngine::empty()))),
        config,
    );

    assert_eq!(ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1").len(), 3);
}

#[test]
fn test_frames_are_written_to_frames_dir() {
    let dir = tempfile::tempdir().unwrap();
    let frames_dir = dir.path().join("frames");
    let ingestor = ingestor(
        MockMediaOpener::new(4.0),
        MockTranscriber::new(Vec::new()),
        MockOcrEngine::empty(),
        &frames_dir,
    );

    let chunks = ingestor.ingest(&dir.path().join("vid.mp4"), "vid-1");

    assert!(frames_dir.join("vid-1_frame_000.jpg").is_file());
    assert!(frames_dir.join("vid-1_frame_001.jpg").is_file());
    assert_eq!(
        chunks[0].image_path.as_deref(),
        Some(frames_dir.join("vid-1_frame_000.jpg").to_str().unwrap())
    );
}

fn sample_regions() -> Vec<OcrRegion> {
    vec![
        OcrRegion {
            bbox: [0.1, 0.1, 0.5, 0.3],
            text: "INVOICE".to_string(),
            confidence: 0.92,
        },
        OcrRegion {
            bbox: [0.2, 0.6, 0.8, 0.7],
            text: "TOTAL 42".to_string(),
            confidence: 0.71,
        },
    ]
}

#[test]
fn test_assemble_window_chunks_is_deterministic() {
    let path = PathBuf::from("frames/vid-1_frame_000.jpg");

    let first = assemble_window_chunks("vid-1", &path, 0.0, 2.0, sample_regions(), "narration");
    let second = assemble_window_chunks("vid-1", &path, 0.0, 2.0, sample_regions(), "narration");

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_assemble_window_chunks_without_audio_uses_region_text_only() {
    let path = PathBuf::from("frames/vid-1_frame_000.jpg");

    let chunks = assemble_window_chunks("vid-1", &path, 0.0, 2.0, sample_regions(), "");

    assert_eq!(chunks[0].text_content.as_deref(), Some("INVOICE"));
    assert_eq!(chunks[1].text_content.as_deref(), Some("TOTAL 42"));
}

#[test]
fn test_assemble_window_chunks_empty_frame_keeps_audio_only_chunk() {
    let path = PathBuf::from("frames/vid-1_frame_000.jpg");

    let chunks = assemble_window_chunks("vid-1", &path, 2.0, 4.0, Vec::new(), "  spoken words ");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text_content.as_deref(), Some("spoken words"));
    assert_eq!(chunks[0].bbox, None);
    assert_eq!(chunks[0].ocr_confidence, None);
}
