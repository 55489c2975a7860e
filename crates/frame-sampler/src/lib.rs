//! Frame Sampler for Facial-Expression Stress Estimation
//!
//! Samples the live camera on a fixed cadence, classifies one frame per
//! tick (never two at once), scores it, and folds the score into the
//! session held by a [`StressContext`].

mod config;
mod context;
mod sampler;

pub use config::SamplerConfig;
pub use context::StressContext;
pub use sampler::{FrameSampler, SamplerHandle, SamplerReport};

use camera_capture::CameraError;
use thiserror::Error;

/// Sampler error types
#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sampling task failed: {0}")]
    Task(String),
}
