//! Live frame sources

use crate::{CameraError, VideoFrame};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// An already-playing video stream the sampler can read from.
pub trait FrameSource: Send + Sync {
    /// Grab the frame currently being shown.
    fn current_frame(&self) -> Result<VideoFrame, CameraError>;

    /// Whether the stream is playing and can be sampled.
    fn is_live(&self) -> bool;

    /// Stop the stream's tracks. Further grabs fail with [`CameraError::Released`].
    fn release(&self);
}

/// Frame source for a stream shown in the browser: hands out numbered
/// frame handles while live.
pub struct OpaqueFrameSource {
    sequence: AtomicU64,
    live: AtomicBool,
}

impl OpaqueFrameSource {
    pub fn new() -> Self {
        info!("Creating opaque frame source");
        Self {
            sequence: AtomicU64::new(0),
            live: AtomicBool::new(true),
        }
    }

    /// Source whose camera could not be acquired
    pub fn unavailable() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            live: AtomicBool::new(false),
        }
    }

    /// Number of frames handed out so far
    pub fn frames_taken(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl Default for OpaqueFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for OpaqueFrameSource {
    fn current_frame(&self) -> Result<VideoFrame, CameraError> {
        if !self.is_live() {
            return Err(CameraError::Released);
        }
        Ok(VideoFrame::new(self.sequence.fetch_add(1, Ordering::SeqCst)))
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn release(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!("Frame source released after {} frames", self.frames_taken());
        }
    }
}
