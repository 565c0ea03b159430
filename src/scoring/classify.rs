use crate::serp::RawResult;
use crate::table::{self, ReferenceTable, DEFAULT_TAG};

use super::config::ScoringConfig;

/// One ranked result with its tags and derived weights.
#[derive(Debug, Clone)]
pub struct ClassifiedResult {
    pub position: u32,
    pub url: Option<String>,
    pub regulation: String,
    pub class: String,
    pub class_weight: f64,
    pub regulation_weight: f64,
    pub combined_weight: f64,
}

/// Annotate every organic result with reference-table tags and weights.
///
/// Returns a new sequence; the source document is untouched. Order and
/// position numbers are preserved, every result visited exactly once.
pub fn classify(
    results: &[RawResult],
    table: &ReferenceTable,
    config: &ScoringConfig,
) -> Vec<ClassifiedResult> {
    results.iter().map(|r| classify_one(r, table, config)).collect()
}

fn classify_one(
    result: &RawResult,
    table: &ReferenceTable,
    config: &ScoringConfig,
) -> ClassifiedResult {
    let (regulation, class) = match result.link.as_deref() {
        Some(link) => {
            let domain = table::url_domain(link);
            let (regulation, class) = table.lookup(&domain);
            (regulation.to_string(), class.to_string())
        }
        // No URL at all: default tags without attempting normalization
        None => (DEFAULT_TAG.to_string(), DEFAULT_TAG.to_string()),
    };

    let class_weight = config.class_weight(&class);
    let regulation_weight = config.regulation_weight(&regulation);

    ClassifiedResult {
        position: result.position,
        url: result.link.clone(),
        regulation,
        class,
        class_weight,
        regulation_weight,
        combined_weight: (class_weight + regulation_weight) / 2.0,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ReferenceEntry;

    fn table() -> ReferenceTable {
        ReferenceTable::from_entries(vec![
            ReferenceEntry {
                domain: "example.com".into(),
                regulation: "Regulated".into(),
                class: "Publisher".into(),
            },
            ReferenceEntry {
                domain: "bet365.com".into(),
                regulation: "Regulated".into(),
                class: "Operator".into(),
            },
        ])
    }

    fn result(position: u32, link: Option<&str>) -> RawResult {
        RawResult { position, link: link.map(String::from) }
    }

    #[test]
    fn tags_and_weights_from_table() {
        let config = ScoringConfig::standard();
        let classified = classify(
            &[result(1, Some("https://www.EXAMPLE.com/page"))],
            &table(),
            &config,
        );
        let r = &classified[0];
        assert_eq!(r.regulation, "Regulated");
        assert_eq!(r.class, "Publisher");
        assert_eq!(r.class_weight, 1.0);
        assert_eq!(r.regulation_weight, 2.0);
        assert_eq!(r.combined_weight, 1.5);
    }

    #[test]
    fn missing_and_malformed_urls_fall_back_to_other() {
        let config = ScoringConfig::standard();
        let classified = classify(
            &[result(1, None), result(2, Some("not a url"))],
            &table(),
            &config,
        );
        for r in &classified {
            assert_eq!(r.regulation, "Other");
            assert_eq!(r.class, "Other");
            assert_eq!(r.combined_weight, 1.0);
        }
    }

    #[test]
    fn order_and_positions_preserved() {
        let config = ScoringConfig::standard();
        let input = vec![
            result(3, Some("https://example.com/a")),
            result(1, Some("https://bet365.com/b")),
            result(12, None),
        ];
        let classified = classify(&input, &table(), &config);
        let positions: Vec<u32> = classified.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![3, 1, 12]);
        assert_eq!(classified.len(), input.len());
    }

    #[test]
    fn combined_weight_is_exact_mean_within_bounds() {
        for config in [ScoringConfig::standard(), ScoringConfig::strict()] {
            let classified = classify(
                &[
                    result(1, Some("https://bet365.com/casino")),
                    result(2, Some("https://example.com/")),
                    result(3, Some("https://unmapped.example/")),
                ],
                &table(),
                &config,
            );
            for r in &classified {
                assert_eq!(r.combined_weight, (r.class_weight + r.regulation_weight) / 2.0);
                assert!((0.0..=2.5).contains(&r.combined_weight));
            }
        }
    }

    #[test]
    fn strict_preset_raises_operator_regulated() {
        let classified = classify(
            &[result(1, Some("https://bet365.com/casino"))],
            &table(),
            &ScoringConfig::strict(),
        );
        assert_eq!(classified[0].combined_weight, 2.5);
    }
}
