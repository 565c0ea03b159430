use std::fmt;

use super::classify::ClassifiedResult;
use super::config::{Calibration, ScoringConfig};
use super::features::{FeatureKind, FeatureSet};

/// Aggregation output, from per-component sums down to the rescaled index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub feature_component: f64,
    pub positional_component: f64,
    pub raw_score: f64,
    pub final_score: f64,
    pub difficulty: f64,
}

/// Combine feature counts and positional weights into one breakdown.
///
/// Feature component: Σ weight(kind) × count(kind).
/// Positional component: Σ combined_weight × multiplier(rank) over ranks
/// 1..=10 only; a result outside that range contributes zero. When the SERP
/// carries no ads the alternate multiplier table is consulted.
pub fn aggregate(
    results: &[ClassifiedResult],
    features: &FeatureSet,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let feature_component: f64 = FeatureKind::ALL
        .iter()
        .map(|&kind| config.feature_weights.get(kind) * features.get(kind).count as f64)
        .sum();

    let use_alt = features.get(FeatureKind::Ads).count == 0;
    let positional_component: f64 = results
        .iter()
        .filter_map(|r| {
            config
                .multiplier(r.position, use_alt)
                .map(|m| r.combined_weight * m)
        })
        .sum();

    let raw_score = feature_component + positional_component;
    let final_score = raw_score * config.scale_factor;
    let difficulty = normalize(final_score, config.calibration);

    ScoreBreakdown {
        feature_component,
        positional_component,
        raw_score,
        final_score,
        difficulty,
    }
}

/// Min–max rescale of a final score onto the nominal 0–100 scale.
/// Deliberately not clamped: values outside [0,100] mean the calibration
/// anchors do not fit this weight configuration.
pub fn normalize(final_score: f64, calibration: Calibration) -> f64 {
    (final_score - calibration.low) / (calibration.high - calibration.low) * 100.0
}

/// Qualitative difficulty tier on contiguous 20-point bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    OutOfRange,
}

impl Tier {
    pub fn from_difficulty(difficulty: f64) -> Self {
        if !(0.0..=100.0).contains(&difficulty) {
            // NaN lands here too
            Tier::OutOfRange
        } else if difficulty <= 20.0 {
            Tier::VeryLow
        } else if difficulty <= 40.0 {
            Tier::Low
        } else if difficulty <= 60.0 {
            Tier::Medium
        } else if difficulty <= 80.0 {
            Tier::High
        } else {
            Tier::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::VeryLow => "very low",
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
            Tier::VeryHigh => "very high",
            Tier::OutOfRange => "out of range",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Tests ──
