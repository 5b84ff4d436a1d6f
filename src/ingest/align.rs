//! Temporal alignment of transcript segments to frame windows.

use crate::chunk::EvidenceChunk;

/// Concatenates the text of every audio segment overlapping `[start, end]`,
/// in the segments' original order, space-joined.
///
/// The overlap test is inclusive at both boundaries: a segment ending
/// exactly at `start`, or starting exactly at `end`, still counts. Speech
/// rarely stops on a window edge, and a boundary-touching segment is more
/// context than noise.
pub fn audio_text_for_window(segments: &[EvidenceChunk], start: f64, end: f64) -> String {
    let mut texts: Vec<&str> = Vec::new();

    for segment in segments {
        let seg_start = segment.timestamp_start.unwrap_or(0.0);
        let seg_end = segment.timestamp_end.unwrap_or(seg_start);

        if seg_end >= start && seg_start <= end {
            if let Some(text) = segment.text_content.as_deref() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    texts.push(trimmed);
                }
            }
        }
    }

    texts.join(" ")
}
