pub mod classify;
pub mod config;
pub mod features;
pub mod score;

pub use classify::ClassifiedResult;
pub use config::{Preset, ScoringConfig};
pub use features::{FeatureKind, FeatureSet};
pub use score::{ScoreBreakdown, Tier};

use crate::serp::SerpData;
use crate::table::ReferenceTable;

/// Scoring result for one query; the presentation layer consumes only this.
#[derive(Debug, Clone)]
pub struct QueryScore {
    pub query: String,
    pub location: String,
    pub difficulty: f64,
    pub tier: Tier,
    /// All classified results in document order; only ranks 1..=10 scored.
    pub results: Vec<ClassifiedResult>,
    pub features: FeatureSet,
    pub breakdown: ScoreBreakdown,
}

/// Four-pass pipeline: classify results → extract features → aggregate → tier.
pub fn score_serp(
    query: &str,
    location: &str,
    serp: &SerpData,
    table: &ReferenceTable,
    config: &ScoringConfig,
) -> QueryScore {
    let results = classify::classify(&serp.organic_results, table, config);
    let features = features::extract(serp);
    let breakdown = score::aggregate(&results, &features, config);

    QueryScore {
        query: query.to_string(),
        location: location.to_string(),
        difficulty: breakdown.difficulty,
        tier: Tier::from_difficulty(breakdown.difficulty),
        results,
        features,
        breakdown,
    }
}

// ── Tests ──
