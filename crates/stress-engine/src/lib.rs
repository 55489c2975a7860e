//! Stress Scoring Engine
//!
//! Deterministic lookup-and-scale from the dominant facial expression to a
//! 0-100 stress score and a five-way stress band.

mod band;
mod engine;

pub use band::StressBand;
pub use engine::{rule_for, score, score_or_neutral, stress_score, ScoreSample, ScoringRule};

use thiserror::Error;

/// Errors during scoring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StressError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
