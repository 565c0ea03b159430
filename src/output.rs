use std::path::Path;

use anyhow::{Context, Result};

use crate::scoring::QueryScore;

/// The report and the CSV export both show at most the first ten results.
const REPORT_RESULTS: usize = 10;

/// Print one query's scoring report: difficulty, result table, features.
pub fn print_report(score: &QueryScore) {
    println!("\nResults for: {}", score.query);
    if !score.location.is_empty() {
        println!("Location: {}", score.location);
    }
    println!("Difficulty: {:.2} ({})", score.difficulty, score.tier);

    let b = &score.breakdown;
    println!(
        "Breakdown: positional {:.2} + features {:.2} = raw {:.2}, scaled {:.2}",
        b.positional_component, b.feature_component, b.raw_score, b.final_score
    );

    println!(
        "{:>3} | {:<56} | {:<12} | {:<10}",
        "#", "URL", "Regulation", "Class"
    );
    println!("{}", "-".repeat(90));
    for r in score.results.iter().take(REPORT_RESULTS) {
        let url = r.url.as_deref().unwrap_or("URL not available");
        println!(
            "{:>3} | {:<56} | {:<12} | {:<10}",
            r.position,
            truncate(url, 56),
            r.regulation,
            r.class
        );
    }

    println!("\nAds and SERP features:");
    for block in score.features.iter() {
        println!("  {}: {}", block.kind.label(), block.count);
        for link in &block.links {
            println!("    - {}", link);
        }
    }
}

/// Export the per-query results tables (first ten rows each) as CSV.
pub fn write_csv(scores: &[QueryScore], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for record in csv_records(scores) {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_records(scores: &[QueryScore]) -> Vec<[String; 5]> {
    let mut records = vec![[
        "Query".to_string(),
        "Position".to_string(),
        "URL".to_string(),
        "Regulation".to_string(),
        "Class".to_string(),
    ]];
    for score in scores {
        for r in score.results.iter().take(REPORT_RESULTS) {
            records.push([
                score.query.clone(),
                r.position.to_string(),
                r.url.clone().unwrap_or_default(),
                r.regulation.clone(),
                r.class.clone(),
            ]);
        }
    }
    records
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
