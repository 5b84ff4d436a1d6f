//! Keyframe sampling and frame preprocessing.

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Seconds between samples at `rate` samples/sec.
///
/// Callers must hand in a validated positive rate (see
/// [`Config::validate`](crate::config::Config::validate)).
pub fn sample_interval(rate: f64) -> f64 {
    1.0 / rate
}

/// Ordered sample timestamps: `0, interval, 2·interval, …` while under
/// `duration` and under `max_samples`. Each timestamp `t` owns the
/// half-open window `[t, t + interval)`.
///
/// Bounds both total work and output cardinality regardless of video
/// length.
pub fn sample_timestamps(duration: f64, rate: f64, max_samples: usize) -> Vec<f64> {
    let interval = sample_interval(rate);

    let mut times = Vec::new();
    let mut t = 0.0;
    while t < duration && times.len() < max_samples {
        times.push(t);
        t += interval;
    }
    times
}

/// Post-downscale dimensions for a `w × h` frame, or `None` when the frame
/// already fits `max_width`. Aspect ratio is preserved; both axes round to
/// the nearest integer.
pub fn downscale_dimensions(w: u32, h: u32, max_width: u32) -> Option<(u32, u32)> {
    if w <= max_width {
        return None;
    }

    let scale = max_width as f64 / w as f64;
    let new_w = (w as f64 * scale).round() as u32;
    let new_h = (h as f64 * scale).round() as u32;
    Some((new_w, new_h))
}

/// Downscales oversized frames; smaller frames pass through untouched.
///
/// The returned frame's dimensions are the ones all subsequent bbox
/// normalization must use.
pub fn downscale_frame(frame: RgbImage, max_width: u32) -> RgbImage {
    match downscale_dimensions(frame.width(), frame.height(), max_width) {
        Some((w, h)) => imageops::resize(&frame, w, h, FilterType::Triangle),
        None => frame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_timestamps_basic() {
        // rate 0.5 → one sample every 2 seconds.
        let times = sample_timestamps(10.0, 0.5, 100);
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_sample_timestamps_capped() {
        let times = sample_timestamps(10.0, 0.5, 3);
        assert_eq!(times, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_sample_timestamps_zero_duration() {
        assert!(sample_timestamps(0.0, 0.5, 100).is_empty());
    }

    #[test]
    fn test_sample_timestamps_excludes_duration_boundary() {
        // t < duration is strict: a 4s video at 2s intervals samples 0 and 2.
        let times = sample_timestamps(4.0, 0.5, 100);
        assert_eq!(times, vec![0.0, 2.0]);
    }

    #[test]
    fn test_downscale_dimensions_pass_through() {
        assert_eq!(downscale_dimensions(1280, 720, 1280), None);
        assert_eq!(downscale_dimensions(640, 480, 1280), None);
    }

    #[test]
    fn test_downscale_dimensions_preserves_aspect() {
        assert_eq!(downscale_dimensions(1920, 1080, 1280), Some((1280, 720)));
        assert_eq!(downscale_dimensions(2560, 1440, 1280), Some((1280, 720)));
    }

    #[test]
    fn test_downscale_dimensions_rounds() {
        // 1000 → 640 scales 333 to 213.12, rounding down to 213.
        assert_eq!(downscale_dimensions(1000, 333, 640), Some((640, 213)));
    }

    #[test]
    fn test_downscale_frame_resizes_oversized() {
        let frame = RgbImage::new(2000, 1000);
        let resized = downscale_frame(frame, 1280);
        assert_eq!(resized.dimensions(), (1280, 640));
    }

    #[test]
    fn test_downscale_frame_keeps_small_frames() {
        let frame = RgbImage::new(320, 240);
        let resized = downscale_frame(frame, 1280);
        assert_eq!(resized.dimensions(), (320, 240));
    }
}
