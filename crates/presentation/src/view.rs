//! Stress panel view model

use crate::recommendation::{recommend, RecommendationKey};
use emotion::EmotionLabel;
use serde::Serialize;
use session_stats::SessionStats;

/// Color of the stress readout, independent of the five-way stress band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBucket {
    Green,
    Yellow,
    Orange,
    Red,
}

impl ColorBucket {
    /// Bucket for a 0-100 stress score
    pub fn for_score(stress_score: u8) -> Self {
        match stress_score {
            0..=29 => ColorBucket::Green,
            30..=59 => ColorBucket::Yellow,
            60..=79 => ColorBucket::Orange,
            _ => ColorBucket::Red,
        }
    }

    /// Short caption shown under the bar
    pub fn headline(&self) -> &'static str {
        match self {
            ColorBucket::Green => "Low - You're doing great!",
            ColorBucket::Yellow => "Moderate - Take a break",
            ColorBucket::Orange | ColorBucket::Red => "High - Consider relaxation",
        }
    }
}

/// Everything the stress panel renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressView {
    /// `None` until the first sample
    pub color_bucket: Option<ColorBucket>,
    pub headline: Option<&'static str>,
    /// Bar fill, the raw stress score
    pub bar_width_percent: u8,
    pub stress_score: Option<u8>,
    pub stress_label: Option<String>,
    pub emotion: Option<EmotionLabel>,
    pub emoji: Option<&'static str>,
    pub confidence_percent: Option<u8>,
    pub recommendations: Vec<RecommendationKey>,
    pub peak_emotion: Option<EmotionLabel>,
    /// Mean score over the session, one decimal
    pub average_stress: Option<f64>,
    pub sample_count: u64,
}

/// Build the view for the current session state
pub fn present(stats: &SessionStats) -> StressView {
    let current = stats.current.as_ref();
    let color_bucket = current.map(|s| ColorBucket::for_score(s.stress_score));

    StressView {
        color_bucket,
        headline: color_bucket.map(|c| c.headline()),
        bar_width_percent: current.map_or(0, |s| s.stress_score),
        stress_score: current.map(|s| s.stress_score),
        stress_label: current.map(|s| s.stress_band.caption()),
        emotion: current.map(|s| s.top_emotion),
        emoji: current.map(|s| s.top_emotion.emoji()),
        confidence_percent: current.map(|s| s.confidence_percent()),
        recommendations: recommend(current).into_iter().collect(),
        peak_emotion: stats.peak_emotion(),
        average_stress: stats.average_stress().map(|a| (a * 10.0).round() / 10.0),
        sample_count: stats.sample_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use session_stats::update;
    use stress_engine::{ScoreSample, StressBand};

    fn sample(emotion: EmotionLabel, stress_score: u8, band: StressBand) -> ScoreSample {
        ScoreSample {
            top_emotion: emotion,
            confidence: 0.87,
            stress_score,
            stress_band: band,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_color_boundaries() {
        assert_eq!(ColorBucket::for_score(0), ColorBucket::Green);
        assert_eq!(ColorBucket::for_score(29), ColorBucket::Green);
        assert_eq!(ColorBucket::for_score(30), ColorBucket::Yellow);
        assert_eq!(ColorBucket::for_score(59), ColorBucket::Yellow);
        assert_eq!(ColorBucket::for_score(60), ColorBucket::Orange);
        assert_eq!(ColorBucket::for_score(79), ColorBucket::Orange);
        assert_eq!(ColorBucket::for_score(80), ColorBucket::Red);
        assert_eq!(ColorBucket::for_score(100), ColorBucket::Red);
    }

    #[test]
    fn test_empty_session_view() {
        let view = present(&SessionStats::empty());
        assert_eq!(view.color_bucket, None);
        assert_eq!(view.bar_width_percent, 0);
        assert_eq!(view.average_stress, None);
        assert_eq!(
            view.recommendations,
            vec![
                RecommendationKey::Meditation,
                RecommendationKey::Chat,
                RecommendationKey::Distraction
            ]
        );
    }

    #[test]
    fn test_view_uses_latest_sample() {
        let stats = update(
            update(SessionStats::empty(), &sample(EmotionLabel::Angry, 99, StressBand::High)),
            &sample(EmotionLabel::Neutral, 48, StressBand::LowModerate),
        );
        let view = present(&stats);

        assert_eq!(view.color_bucket, Some(ColorBucket::Yellow));
        assert_eq!(view.headline, Some("Moderate - Take a break"));
        assert_eq!(view.bar_width_percent, 48);
        assert_eq!(view.stress_label.as_deref(), Some("Low-Moderate Stress"));
        assert_eq!(view.emotion, Some(EmotionLabel::Neutral));
        assert_eq!(view.confidence_percent, Some(87));
        assert_eq!(view.peak_emotion, Some(EmotionLabel::Angry));
        assert_eq!(view.average_stress, Some(73.5));
        assert_eq!(view.sample_count, 2);
    }

    #[test]
    fn test_view_serializes_for_dashboard() {
        let stats = update(SessionStats::empty(), &sample(EmotionLabel::Happy, 12, StressBand::Low));
        let json = serde_json::to_value(present(&stats)).unwrap();
        assert_eq!(json["color_bucket"], "green");
        assert_eq!(json["recommendations"][0], "affirmation");
        assert_eq!(json["emotion"], "happy");
    }
}
