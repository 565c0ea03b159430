use std::collections::HashMap;

use clap::ValueEnum;

use super::features::FeatureKind;

/// Rank 1..=10 multipliers, earlier ranks weighted hardest.
const POSITION_MULTIPLIERS: [f64; 10] = [5.0, 4.0, 3.0, 1.5, 1.4, 1.3, 1.2, 1.1, 1.05, 1.05];

const CLASS_WEIGHTS: &[(&str, f64)] = &[
    ("Publisher", 1.0),
    ("Parasite", 2.0),
    ("UGC", 2.0),
    ("Operator", 2.0),
    ("News", 2.0),
    ("Apps", 2.0),
    ("App", 2.0),
    ("Social", 2.0),
    ("Other", 1.0),
];

const REGULATION_WEIGHTS: &[(&str, f64)] = &[
    ("Regulated", 2.0),
    ("Unregulated", 1.0),
    ("Other", 1.0),
];

/// Observed raw-output envelope for one weight set. Anchors are coupled to
/// the weight tables they were calibrated against; never reuse across presets.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub low: f64,
    pub high: f64,
}

/// Per-feature-kind weights applied to SERP feature counts.
#[derive(Debug, Clone, Copy)]
pub struct FeatureWeights {
    pub ads: f64,
    pub related_questions: f64,
    pub answer_box: f64,
    pub discussions_and_forums: f64,
    pub knowledge_graph: f64,
}

impl FeatureWeights {
    pub fn get(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Ads => self.ads,
            FeatureKind::RelatedQuestions => self.related_questions,
            FeatureKind::AnswerBox => self.answer_box,
            FeatureKind::DiscussionsAndForums => self.discussions_and_forums,
            FeatureKind::KnowledgeGraph => self.knowledge_graph,
        }
    }
}

/// Named weight-set variants selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Operator/Regulated weighted 2.
    Standard,
    /// Operator/Regulated raised to 2.5, with its own calibration pair.
    Strict,
}

impl Preset {
    pub fn config(self) -> ScoringConfig {
        match self {
            Preset::Standard => ScoringConfig::standard(),
            Preset::Strict => ScoringConfig::strict(),
        }
    }
}

/// One immutable configuration value passed through the whole pipeline.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub class_weights: HashMap<String, f64>,
    pub regulation_weights: HashMap<String, f64>,
    pub position_multipliers: [f64; 10],
    /// Used instead of `position_multipliers` when the SERP carries no ads.
    /// Identical in both shipped presets; kept as a tuning hook.
    pub alt_position_multipliers: [f64; 10],
    pub feature_weights: FeatureWeights,
    pub scale_factor: f64,
    pub calibration: Calibration,
}

impl ScoringConfig {
    pub fn standard() -> Self {
        Self {
            class_weights: weight_map(CLASS_WEIGHTS),
            regulation_weights: weight_map(REGULATION_WEIGHTS),
            position_multipliers: POSITION_MULTIPLIERS,
            alt_position_multipliers: POSITION_MULTIPLIERS,
            feature_weights: FeatureWeights {
                ads: 2.0,
                related_questions: 1.05,
                answer_box: 1.0,
                discussions_and_forums: 1.05,
                knowledge_graph: 1.0,
            },
            scale_factor: 2.0,
            calibration: Calibration { low: 41.2, high: 101.3 },
        }
    }

    pub fn strict() -> Self {
        let mut config = Self::standard();
        config.class_weights.insert("Operator".to_string(), 2.5);
        config.regulation_weights.insert("Regulated".to_string(), 2.5);
        config.calibration = Calibration { low: 41.2, high: 121.9 };
        config
    }

    /// Weight for a class tag; unrecognized tags weigh 0.
    pub fn class_weight(&self, tag: &str) -> f64 {
        self.class_weights.get(tag).copied().unwrap_or(0.0)
    }

    /// Weight for a regulation tag; unrecognized tags weigh 0.
    pub fn regulation_weight(&self, tag: &str) -> f64 {
        self.regulation_weights.get(tag).copied().unwrap_or(0.0)
    }

    /// Multiplier for a 1-based rank. Ranks outside 1..=10 are excluded
    /// from scoring entirely.
    pub fn multiplier(&self, position: u32, use_alt: bool) -> Option<f64> {
        if !(1..=10).contains(&position) {
            return None;
        }
        let table = if use_alt {
            &self.alt_position_multipliers
        } else {
            &self.position_multipliers
        };
        Some(table[(position - 1) as usize])
    }
}

fn weight_map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|&(tag, w)| (tag.to_string(), w)).collect()
}

// ── Tests ──
