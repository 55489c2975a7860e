//! Session aggregate tracking

use chrono::{DateTime, Duration, Utc};
use emotion::EmotionLabel;
use serde::{Deserialize, Serialize};
use stress_engine::ScoreSample;
use tracing::{debug, info};
use uuid::Uuid;

/// Most severe emotion seen this session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEmotion {
    pub emotion: EmotionLabel,
    /// Score of the sample that set the peak
    pub stress_score: u8,
}

/// Running statistics for one sampling session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identity, new on every reset
    pub session_id: Uuid,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// Emotion of the highest-scoring sample so far
    pub peak: Option<PeakEmotion>,
    /// Number of samples folded in
    pub sample_count: u64,
    /// Sum of all sample scores
    pub running_stress_sum: f64,
    /// Most recent sample
    pub current: Option<ScoreSample>,
}

impl SessionStats {
    /// Fresh, empty session
    pub fn empty() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            peak: None,
            sample_count: 0,
            running_stress_sum: 0.0,
            current: None,
        }
    }

    /// Mean stress score, `None` before the first sample
    pub fn average_stress(&self) -> Option<f64> {
        if self.sample_count == 0 {
            return None;
        }
        Some(self.running_stress_sum / self.sample_count as f64)
    }

    pub fn peak_emotion(&self) -> Option<EmotionLabel> {
        self.peak.map(|p| p.emotion)
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Time since the session started
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fold one sample into the session.
///
/// The peak only moves on a strictly higher score, so the earliest of
/// equally severe samples keeps it.
pub fn update(mut stats: SessionStats, sample: &ScoreSample) -> SessionStats {
    stats.sample_count += 1;
    stats.running_stress_sum += f64::from(sample.stress_score);

    let raises_peak = stats
        .peak
        .map_or(true, |peak| sample.stress_score > peak.stress_score);
    if raises_peak {
        debug!("New session peak: {} ({})", sample.top_emotion, sample.stress_score);
        stats.peak = Some(PeakEmotion {
            emotion: sample.top_emotion,
            stress_score: sample.stress_score,
        });
    }

    stats.current = Some(sample.clone());
    stats
}

/// Discard all aggregates and start a new session
pub fn reset() -> SessionStats {
    SessionStats::empty()
}

/// Owner of a session's aggregates
#[derive(Debug, Default)]
pub struct SessionAggregator {
    stats: SessionStats,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a sample in
    pub fn record(&mut self, sample: &ScoreSample) {
        let stats = std::mem::take(&mut self.stats);
        self.stats = update(stats, sample);
    }

    /// Start over
    pub fn reset(&mut self) {
        info!(
            "Resetting session {} after {} samples",
            self.stats.session_id, self.stats.sample_count
        );
        self.stats = reset();
    }

    /// Read-only view of the aggregates
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stress_engine::StressBand;

    fn sample(emotion: EmotionLabel, stress_score: u8) -> ScoreSample {
        ScoreSample {
            top_emotion: emotion,
            confidence: 0.9,
            stress_score,
            stress_band: StressBand::Moderate,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_session() {
        let stats = SessionStats::empty();
        assert!(stats.is_empty());
        assert_eq!(stats.average_stress(), None);
        assert_eq!(stats.peak_emotion(), None);
        assert!(stats.current.is_none());
    }

    #[test]
    fn test_peak_tracks_highest_not_latest() {
        let mut agg = SessionAggregator::new();
        agg.record(&sample(EmotionLabel::Neutral, 40));
        agg.record(&sample(EmotionLabel::Fearful, 95));
        agg.record(&sample(EmotionLabel::Surprised, 60));

        let stats = agg.stats();
        assert_eq!(stats.peak_emotion(), Some(EmotionLabel::Fearful));
        assert_eq!(stats.current.as_ref().unwrap().top_emotion, EmotionLabel::Surprised);
    }

    #[test]
    fn test_three_ticks_average() {
        let stats = [
            sample(EmotionLabel::Happy, 20),
            sample(EmotionLabel::Sad, 80),
            sample(EmotionLabel::Surprised, 50),
        ]
        .iter()
        .fold(reset(), update);

        assert_eq!(stats.sample_count, 3);
        assert_eq!(stats.average_stress(), Some(50.0));
        assert_eq!(stats.peak_emotion(), Some(EmotionLabel::Sad));
    }

    #[test]
    fn test_equal_score_keeps_earlier_peak() {
        let stats = update(update(reset(), &sample(EmotionLabel::Angry, 95)), &sample(EmotionLabel::Fearful, 95));
        assert_eq!(stats.peak_emotion(), Some(EmotionLabel::Angry));
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut agg = SessionAggregator::new();
        agg.record(&sample(EmotionLabel::Angry, 99));
        let old_id = agg.stats().session_id;

        agg.reset();
        let stats = agg.stats();
        assert_eq!(stats.sample_count, 0);
        assert_eq!(stats.average_stress(), None);
        assert_eq!(stats.peak, None);
        assert_ne!(stats.session_id, old_id);
    }

    #[test]
    fn test_elapsed_never_negative() {
        let stats = SessionStats::empty();
        let before = stats.started_at - Duration::seconds(5);
        assert_eq!(stats.elapsed(before), Duration::zero());
        assert_eq!(stats.elapsed(stats.started_at + Duration::seconds(222)).num_seconds(), 222);
    }

    proptest! {
        #[test]
        fn prop_count_and_average(scores in proptest::collection::vec(0u8..=100, 1..50)) {
            let stats = scores
                .iter()
                .map(|s| sample(EmotionLabel::Neutral, *s))
                .fold(reset(), |acc, s| update(acc, &s));

            let expected = scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64;
            prop_assert_eq!(stats.sample_count, scores.len() as u64);
            prop_assert!((stats.average_stress().unwrap() - expected).abs() < 1e-9);
            prop_assert_eq!(stats.peak.unwrap().stress_score, *scores.iter().max().unwrap());
        }
    }
}
