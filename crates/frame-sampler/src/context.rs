//! Shared read interface over the session

use session_stats::{SessionAggregator, SessionStats};
use std::sync::Arc;
use stress_engine::ScoreSample;
use tokio::sync::RwLock;
use tracing::debug;

/// Handle to the current stress session.
///
/// Cloned into whatever needs to read the session; only the sampler and
/// explicit resets write through it.
#[derive(Clone, Default)]
pub struct StressContext {
    aggregator: Arc<RwLock<SessionAggregator>>,
}

impl StressContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the latest committed aggregates
    pub async fn snapshot(&self) -> SessionStats {
        self.aggregator.read().await.stats().clone()
    }

    /// Discard the session and start a fresh one
    pub async fn reset(&self) {
        self.aggregator.write().await.reset();
    }

    pub(crate) async fn record(&self, sample: &ScoreSample) {
        let mut aggregator = self.aggregator.write().await;
        aggregator.record(sample);
        debug!(
            "Session now {} samples (avg {:?})",
            aggregator.stats().sample_count,
            aggregator.stats().average_stress()
        );
    }
}
