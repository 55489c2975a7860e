//! Session Aggregator
//!
//! Folds scored samples into running session aggregates. Only aggregates
//! are kept; individual samples are dropped once folded in.

mod aggregator;

pub use aggregator::{reset, update, PeakEmotion, SessionAggregator, SessionStats};
