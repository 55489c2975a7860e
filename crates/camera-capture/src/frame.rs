//! Video frame handles

use std::time::{SystemTime, UNIX_EPOCH};

/// A single frame handed to the expression classifier.
///
/// The pixels stay with the video element that shows them (the browser runs
/// the expression network), so a frame here only identifies which image was
/// current at the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFrame {
    /// Capture timestamp (milliseconds since the Unix epoch)
    pub captured_at_ms: u64,
    /// Frame sequence number within the stream
    pub sequence: u64,
}

impl VideoFrame {
    /// Handle for the frame captured now
    pub fn new(sequence: u64) -> Self {
        Self {
            captured_at_ms: now_ms(),
            sequence,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
