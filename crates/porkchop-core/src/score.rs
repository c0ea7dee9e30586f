//! Pork-likelihood scores.
//!
//! The blend weights and band thresholds are policy choices carried over
//! unchanged so scores stay comparable across bills. They are constants, not
//! per-call parameters.

use serde::{Deserialize, Serialize};

/// Weight of the heuristic score when an AI score is present.
pub const HEURISTIC_WEIGHT: f64 = 0.3;
/// Weight of the AI score when present.
pub const AI_WEIGHT: f64 = 0.7;
/// Blended scores at or above this are worth a second look.
pub const WATCH_THRESHOLD: f64 = 30.0;
/// Blended scores at or above this are reported as likely pork.
pub const PORK_THRESHOLD: f64 = 60.0;
/// Heuristic scores at or above this are sent for semantic review.
pub const AI_REVIEW_THRESHOLD: f64 = 30.0;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Clamp to `[0, 100]`, mapping NaN to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// `0.3 * heuristic + 0.7 * ai` when an AI score is present, else the heuristic.
pub fn blend(heuristic: f64, ai: Option<f64>) -> f64 {
    let heuristic = clamp_score(heuristic);
    match ai {
        Some(ai) => clamp_score(HEURISTIC_WEIGHT * heuristic + AI_WEIGHT * clamp_score(ai)),
        None => heuristic,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Watch,
    Pork,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= PORK_THRESHOLD {
            Self::Pork
        } else if score >= WATCH_THRESHOLD {
            Self::Watch
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Watch => "watch",
            Self::Pork => "pork",
        }
    }
}

/// Explainable score for one funding item: every contributing signal is
/// listed in `flags` (machine-readable) and `reasons` (human-readable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PorkScore {
    /// Index of the item in the document's funding list.
    pub funding_item_id: usize,
    pub heuristic_score: f64,
    pub ai_score: Option<f64>,
    pub blended_score: f64,
    pub flags: Vec<String>,
    pub reasons: Vec<String>,
}

impl PorkScore {
    /// Build a score, clamping inputs and deriving `blended_score`.
    pub fn new(
        funding_item_id: usize,
        heuristic_score: f64,
        ai_score: Option<f64>,
        flags: Vec<String>,
        reasons: Vec<String>,
    ) -> Self {
        let heuristic_score = clamp_score(heuristic_score);
        let ai_score = ai_score.map(clamp_score);
        Self {
            funding_item_id,
            heuristic_score,
            ai_score,
            blended_score: blend(heuristic_score, ai_score),
            flags,
            reasons,
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.blended_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_weights_heuristic_and_ai() {
        let score = PorkScore::new(0, 40.0, Some(80.0), vec![], vec![]);
        assert!((score.blended_score - 68.0).abs() < 1e-9, "got {}", score.blended_score);
    }

    #[test]
    fn blend_without_ai_is_heuristic() {
        assert_eq!(blend(42.0, None), 42.0);
    }

    #[test]
    fn out_of_range_inputs_clamped() {
        let score = PorkScore::new(0, 140.0, Some(-20.0), vec![], vec![]);
        assert_eq!(score.heuristic_score, 100.0);
        assert_eq!(score.ai_score, Some(0.0));
        assert!((score.blended_score - 30.0).abs() < 1e-9);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(29.9), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(30.0), ScoreBand::Watch);
        assert_eq!(ScoreBand::from_score(59.9), ScoreBand::Watch);
        assert_eq!(ScoreBand::from_score(60.0), ScoreBand::Pork);
    }
}
