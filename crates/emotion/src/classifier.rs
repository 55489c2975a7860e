//! Classifier adapters

use crate::{EmotionError, EmotionVector};
use async_trait::async_trait;
use camera_capture::VideoFrame;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Result of classifying one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A face was found; its expression probabilities
    Face(EmotionVector),
    /// Nobody in frame. A normal outcome, not a failure.
    NoFace,
}

/// Black-box expression classifier.
///
/// Implementations must return `Ok(Classification::NoFace)` when no face is
/// visible and reserve `Err` for genuine inference failures.
#[async_trait]
pub trait ExpressionClassifier: Send + Sync {
    async fn classify(&self, frame: &VideoFrame) -> Result<Classification, EmotionError>;
}

/// Classifier whose results are computed elsewhere (the browser runs the
/// expression network) and pushed in. Each pushed vector is consumed by at
/// most one tick; with nothing pending the tick sees no face.
#[derive(Default)]
pub struct PushedExpressionClassifier {
    pending: Mutex<Option<EmotionVector>>,
}

impl PushedExpressionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending expression with the latest observation
    pub fn push(&self, vector: EmotionVector) -> Result<(), EmotionError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| EmotionError::Classifier(format!("Lock error: {}", e)))?;
        if pending.replace(vector).is_some() {
            debug!("Dropping unconsumed expression in favour of newer one");
        }
        Ok(())
    }

    /// Whether an expression is waiting for the next tick
    pub fn has_pending(&self) -> bool {
        self.pending.lock().map(|p| p.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl ExpressionClassifier for PushedExpressionClassifier {
    async fn classify(&self, _frame: &VideoFrame) -> Result<Classification, EmotionError> {
        let taken = self
            .pending
            .lock()
            .map_err(|e| EmotionError::Classifier(format!("Lock error: {}", e)))?
            .take();

        Ok(match taken {
            Some(vector) if !vector.is_empty() => Classification::Face(vector),
            _ => Classification::NoFace,
        })
    }
}

/// One scripted classifier outcome
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Face(EmotionVector),
    NoFace,
    Fail(String),
}

/// Classifier that replays a fixed sequence, optionally looping, with an
/// artificial inference latency. Used for demo mode and tests.
pub struct ScriptedClassifier {
    steps: Mutex<VecDeque<ScriptStep>>,
    looping: bool,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        let steps: VecDeque<_> = steps.into_iter().collect();
        info!("Creating scripted classifier with {} steps", steps.len());
        Self {
            steps: Mutex::new(steps),
            looping: false,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Restart from the first step once the script runs out
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Simulated inference time per call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of classify calls started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously outstanding calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Result<ScriptStep, EmotionError> {
        let mut steps = self
            .steps
            .lock()
            .map_err(|e| EmotionError::Classifier(format!("Lock error: {}", e)))?;
        let step = steps.pop_front().unwrap_or(ScriptStep::NoFace);
        if self.looping {
            steps.push_back(step.clone());
        }
        Ok(step)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExpressionClassifier for ScriptedClassifier {
    async fn classify(&self, _frame: &VideoFrame) -> Result<Classification, EmotionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.next_step()? {
            ScriptStep::Face(vector) => Ok(Classification::Face(vector)),
            ScriptStep::NoFace => Ok(Classification::NoFace),
            ScriptStep::Fail(reason) => Err(EmotionError::Classifier(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmotionLabel;

    fn happy() -> EmotionVector {
        EmotionVector::new().with(EmotionLabel::Happy, 0.9).unwrap()
    }

    #[tokio::test]
    async fn test_pushed_vector_consumed_once() {
        let classifier = PushedExpressionClassifier::new();
        let frame = VideoFrame::new(0);

        assert_eq!(classifier.classify(&frame).await.unwrap(), Classification::NoFace);

        classifier.push(happy()).unwrap();
        assert!(classifier.has_pending());
        assert_eq!(
            classifier.classify(&frame).await.unwrap(),
            Classification::Face(happy())
        );
        assert_eq!(classifier.classify(&frame).await.unwrap(), Classification::NoFace);
    }

    #[tokio::test]
    async fn test_pushed_empty_vector_is_no_face() {
        let classifier = PushedExpressionClassifier::new();
        classifier.push(EmotionVector::new()).unwrap();
        let result = classifier.classify(&VideoFrame::new(0)).await.unwrap();
        assert_eq!(result, Classification::NoFace);
    }

    #[tokio::test]
    async fn test_script_replay() {
        let classifier = ScriptedClassifier::new([
            ScriptStep::Face(happy()),
            ScriptStep::NoFace,
            ScriptStep::Fail("model crashed".to_string()),
        ]);
        let frame = VideoFrame::new(0);

        assert!(matches!(classifier.classify(&frame).await, Ok(Classification::Face(_))));
        assert_eq!(classifier.classify(&frame).await, Ok(Classification::NoFace));
        assert_eq!(
            classifier.classify(&frame).await,
            Err(EmotionError::Classifier("model crashed".to_string()))
        );
        // Exhausted scripts report no face
        assert_eq!(classifier.classify(&frame).await, Ok(Classification::NoFace));
        assert_eq!(classifier.calls(), 4);
        assert_eq!(classifier.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_looping_script() {
        let classifier = ScriptedClassifier::new([ScriptStep::Face(happy())]).looping();
        let frame = VideoFrame::new(0);
        for _ in 0..3 {
            assert!(matches!(classifier.classify(&frame).await, Ok(Classification::Face(_))));
        }
    }
}
