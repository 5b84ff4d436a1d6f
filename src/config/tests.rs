use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_trace_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("TRACE_DATA_DIR");
        env::remove_var("TRACE_FRAMES_DIR");
        env::remove_var("TRACE_QDRANT_URL");
        env::remove_var("TRACE_COLLECTION");
        env::remove_var("TRACE_MAX_VIDEO_DURATION_SECS");
        env::remove_var("TRACE_FRAME_SAMPLE_RATE");
        env::remove_var("TRACE_MAX_KEYFRAMES");
        env::remove_var("TRACE_MAX_FRAME_WIDTH");
        env::remove_var("TRACE_OCR_MIN_CONFIDENCE");
        env::remove_var("TRACE_OCR_LANGUAGES");
        env::remove_var("TRACE_OCR_USE_GPU");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.data_dir, PathBuf::from("./data"));
    assert_eq!(config.frames_dir, PathBuf::from("./data/frames"));
    assert_eq!(config.qdrant_url, "http://localhost:6334");
    assert_eq!(config.collection, "trace_evidence");
    assert_eq!(config.max_video_duration_secs, 600.0);
    assert_eq!(config.frame_sample_rate, 0.5);
    assert_eq!(config.max_keyframes, 30);
    assert_eq!(config.max_frame_width, 1280);
    assert_eq!(config.ocr_languages, vec!["en".to_string()]);
    assert!(!config.ocr_use_gpu);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_trace_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.collection, "trace_evidence");
    assert_eq!(config.max_keyframes, 30);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_trace_env();

    let config = with_env_vars(
        &[
            ("TRACE_DATA_DIR", "/srv/trace/data"),
            ("TRACE_QDRANT_URL", "http://qdrant:6334"),
            ("TRACE_MAX_VIDEO_DURATION_SECS", "120"),
            ("TRACE_FRAME_SAMPLE_RATE", "1.0"),
            ("TRACE_MAX_KEYFRAMES", "10"),
            ("TRACE_OCR_LANGUAGES", "en, de"),
            ("TRACE_OCR_USE_GPU", "true"),
        ],
        || Config::from_env().unwrap(),
    );

    assert_eq!(config.data_dir, PathBuf::from("/srv/trace/data"));
    assert_eq!(config.qdrant_url, "http://qdrant:6334");
    assert_eq!(config.max_video_duration_secs, 120.0);
    assert_eq!(config.frame_sample_rate, 1.0);
    assert_eq!(config.max_keyframes, 10);
    assert_eq!(
        config.ocr_languages,
        vec!["en".to_string(), "de".to_string()]
    );
    assert!(config.ocr_use_gpu);
}

#[test]
#[serial]
fn test_from_env_rejects_unparseable_number() {
    clear_trace_env();

    let result = with_env_vars(&[("TRACE_MAX_KEYFRAMES", "many")], Config::from_env);

    assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
}

#[test]
fn test_validate_default_config() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_non_positive_sample_rate() {
    let config = Config {
        frame_sample_rate: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NonPositiveSampleRate { .. })
    ));
}

#[test]
fn test_validate_rejects_confidence_out_of_range() {
    let config = Config {
        ocr_min_confidence: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ConfidenceOutOfRange { .. })
    ));
}

#[test]
fn test_validate_rejects_file_as_data_dir() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        data_dir: file.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_rejects_empty_languages() {
    let config = Config {
        ocr_languages: Vec::new(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NoOcrLanguages)
    ));
}
