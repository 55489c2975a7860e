//! Camera Capture Library for the Wellness Companion
//!
//! Provides frame handles taken from an already-playing webcam stream.
//! Acquiring the device itself (permissions, `getUserMedia`) belongs to the
//! host; this crate only models:
//! - Video frame handles (the pixels stay with the browser)
//! - Live frame sources the sampler reads from on each tick

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{FrameSource, OpaqueFrameSource};

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Stream released")]
    Released,
}
