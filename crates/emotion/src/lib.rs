//! Facial Expression Model Boundary
//!
//! Everything the stress pipeline knows about the expression classifier:
//! - The closed emotion vocabulary
//! - Per-frame probability vectors
//! - The classifier adapter contract ("no face" is a value, not an error)

pub mod classifier;
pub mod label;
pub mod vector;

pub use classifier::{Classification, ExpressionClassifier, PushedExpressionClassifier, ScriptStep, ScriptedClassifier};
pub use label::EmotionLabel;
pub use vector::EmotionVector;

use thiserror::Error;

/// Emotion error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmotionError {
    #[error("Unknown emotion label: {0}")]
    UnknownLabel(String),

    #[error("Probability for {label} out of range: {value}")]
    InvalidProbability { label: EmotionLabel, value: f64 },

    #[error("Invalid classifier output: expected {expected} channels, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("Classifier failed: {0}")]
    Classifier(String),
}
