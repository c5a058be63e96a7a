//! Confidence scoring.
//!
//! Recomputes confidence from weighted sub-indicators instead of trusting the
//! model's self-reported number, since the upstream model routinely inflates
//! its own confidence. Each sub-score is clamped to its per-key maximum and the
//! sum is capped at 95, never 100. When no sub-scores are present at all,
//! falls back to the self-reported value clamped to [0, 100].

use common::{CandidateSignal, SubScores};
use serde::Deserialize;

/// Hard ceiling of the recomputed score.
pub const SCORE_CAP: u8 = 95;

/// Per-indicator maxima. Business-tunable constants, not derived.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub trend: f64,
    pub oscillator: f64,
    pub oscillator_confirm: f64,
    pub candles: f64,
    pub clarity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            trend: 25.0,
            oscillator: 20.0,
            oscillator_confirm: 20.0,
            candles: 20.0,
            clarity: 15.0,
        }
    }
}

impl ScoreWeights {
    /// Sums the clamped sub-scores into an integer in [0, 95]. Missing or
    /// non-finite sub-scores count as 0, not as failure.
    pub fn score(&self, sub: &SubScores) -> u8 {
        let total = clamp_part(sub.trend, self.trend)
            + clamp_part(sub.oscillator, self.oscillator)
            + clamp_part(sub.oscillator_confirm, self.oscillator_confirm)
            + clamp_part(sub.candles, self.candles)
            + clamp_part(sub.clarity, self.clarity);
        (total.round() as i64).clamp(0, i64::from(SCORE_CAP)) as u8
    }
}

fn clamp_part(value: Option<f64>, max: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, max),
        _ => 0.0,
    }
}

/// Confidence for a candidate: recomputed when sub-scores exist, otherwise the
/// self-reported value clamped to [0, 100], defaulting to 0 when absent.
pub fn effective_confidence(candidate: &CandidateSignal, weights: &ScoreWeights) -> u8 {
    match &candidate.subscores {
        Some(sub) if !sub.is_empty() => weights.score(sub),
        _ => match candidate.confidence {
            Some(c) if c.is_finite() => c.round().clamp(0.0, 100.0) as u8,
            _ => 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_scores() -> SubScores {
        SubScores {
            trend: Some(25.0),
            oscillator: Some(20.0),
            oscillator_confirm: Some(20.0),
            candles: Some(20.0),
            clarity: Some(15.0),
        }
    }

    #[test]
    fn perfect_scores_cap_at_95() {
        let w = ScoreWeights::default();
        assert_eq!(w.score(&full_scores()), 95);
    }

    #[test]
    fn oversized_subscores_clamp_to_their_weight() {
        let w = ScoreWeights::default();
        let sub = SubScores {
            trend: Some(500.0),
            oscillator: Some(-10.0),
            ..Default::default()
        };
        assert_eq!(w.score(&sub), 25);
    }

    #[test]
    fn missing_and_nan_subscores_count_as_zero() {
        let w = ScoreWeights::default();
        let sub = SubScores {
            trend: Some(f64::NAN),
            candles: Some(12.0),
            ..Default::default()
        };
        assert_eq!(w.score(&sub), 12);
    }

    #[test]
    fn fallback_clamps_self_reported_confidence() {
        let w = ScoreWeights::default();
        let mut c = CandidateSignal {
            confidence: Some(140.0),
            ..Default::default()
        };
        assert_eq!(effective_confidence(&c, &w), 100);
        c.confidence = Some(-5.0);
        assert_eq!(effective_confidence(&c, &w), 0);
        c.confidence = None;
        assert_eq!(effective_confidence(&c, &w), 0);
    }

    #[test]
    fn subscores_win_over_self_reported() {
        let w = ScoreWeights::default();
        let c = CandidateSignal {
            confidence: Some(99.0),
            subscores: Some(SubScores {
                trend: Some(10.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(effective_confidence(&c, &w), 10);
    }
}
