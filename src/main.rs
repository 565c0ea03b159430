mod output;
mod scoring;
mod serp;
mod table;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use scoring::{Preset, QueryScore};
use serp::{Device, SerpClient, SerpData, SerpQuery};
use table::ReferenceTable;

const DEFAULT_TABLE: &str = "data/serprating.csv";
const DEFAULT_LOCATION: &str = "los angeles, california, united states";

#[derive(Parser)]
#[command(name = "serp_rater", about = "Keyword difficulty scoring from SERP data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch SERPs and score one or more queries
    Score {
        /// Search queries to score
        queries: Vec<String>,
        /// File with additional queries, one per line
        #[arg(long)]
        from_file: Option<PathBuf>,
        /// Search location
        #[arg(short, long, default_value = DEFAULT_LOCATION)]
        location: String,
        /// 2-letter country code
        #[arg(long, default_value = "us")]
        gl: String,
        /// Device to simulate the search on
        #[arg(short, long, value_enum, default_value_t = Device::Desktop)]
        device: Device,
        /// Results to request per SERP
        #[arg(short, long, default_value = "20")]
        num: u32,
        /// Domain reference table (CSV with Domain, Regulation, Class)
        #[arg(short, long, default_value = DEFAULT_TABLE)]
        table: PathBuf,
        /// Weight-set preset
        #[arg(short, long, value_enum, default_value_t = Preset::Standard)]
        preset: Preset,
        /// Export the result tables as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Score previously saved SERP JSON documents (no API key needed)
    Offline {
        /// Saved SERP documents
        files: Vec<PathBuf>,
        #[arg(short, long, default_value = DEFAULT_TABLE)]
        table: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Preset::Standard)]
        preset: Preset,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show the tags and weights a URL or domain would be scored with
    Lookup {
        /// URL or bare domain
        target: String,
        #[arg(short, long, default_value = DEFAULT_TABLE)]
        table: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Preset::Standard)]
        preset: Preset,
    },
    /// Reference table statistics
    Table {
        #[arg(short, long, default_value = DEFAULT_TABLE)]
        table: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            queries,
            from_file,
            location,
            gl,
            device,
            num,
            table,
            preset,
            csv,
        } => {
            let queries = collect_queries(queries, from_file.as_deref())?;
            if queries.is_empty() {
                println!("No queries given. Pass them as arguments or via --from-file.");
                return Ok(());
            }

            let table = ReferenceTable::load(&table)?;
            if table.is_empty() {
                warn!("Reference table is empty; every result will classify as Other");
            }
            let config = preset.config();
            let client = SerpClient::from_env()?;

            // Phase 1: fetch every SERP (sequential; a failed query does not
            // abort the rest of the batch)
            let pb = batch_progress(queries.len())?;
            let mut fetched: Vec<(String, SerpData)> = Vec::new();
            let mut failures: Vec<(String, anyhow::Error)> = Vec::new();
            for query in &queries {
                let params = SerpQuery {
                    query: query.clone(),
                    location: location.clone(),
                    gl: gl.clone(),
                    device,
                    num,
                };
                match client.fetch(&params).await {
                    Ok(serp) => fetched.push((query.clone(), serp)),
                    Err(e) => {
                        warn!("Query '{}' failed: {:#}", query, e);
                        failures.push((query.clone(), e));
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            }
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }

            // Phase 2: score and report
            let scores: Vec<QueryScore> = fetched
                .iter()
                .map(|(query, serp)| scoring::score_serp(query, &location, serp, &table, &config))
                .collect();
            report(&scores, csv.as_deref())?;

            if !failures.is_empty() {
                println!("\n{} of {} queries failed:", failures.len(), queries.len());
                for (query, e) in &failures {
                    println!("  {}: {:#}", query, e);
                }
            }
            Ok(())
        }
        Commands::Offline { files, table, preset, csv } => {
            if files.is_empty() {
                println!("No SERP documents given.");
                return Ok(());
            }

            let table = ReferenceTable::load(&table)?;
            let config = preset.config();

            let mut scores = Vec::new();
            let mut failures: Vec<(PathBuf, anyhow::Error)> = Vec::new();
            for path in &files {
                match SerpData::from_file(path) {
                    Ok(serp) => {
                        let query = serp
                            .query_label()
                            .map(str::to_string)
                            .unwrap_or_else(|| file_stem(path));
                        let location = serp.location_label().unwrap_or("").to_string();
                        scores.push(scoring::score_serp(&query, &location, &serp, &table, &config));
                    }
                    Err(e) => {
                        warn!("Skipping {}: {:#}", path.display(), e);
                        failures.push((path.clone(), e));
                    }
                }
            }
            report(&scores, csv.as_deref())?;

            if !failures.is_empty() {
                println!("\n{} of {} documents failed:", failures.len(), files.len());
                for (path, e) in &failures {
                    println!("  {}: {:#}", path.display(), e);
                }
            }
            Ok(())
        }
        Commands::Lookup { target, table, preset } => {
            let table = ReferenceTable::load(&table)?;
            let config = preset.config();

            let domain = if target.contains("://") {
                table::url_domain(&target)
            } else {
                table::normalize_domain(&target)
            };
            let (regulation, class) = table.lookup(&domain);
            let class_weight = config.class_weight(class);
            let regulation_weight = config.regulation_weight(regulation);

            let shown = if domain.is_empty() { "(unparseable)" } else { domain.as_str() };
            println!("Domain:           {}", shown);
            println!("Regulation:       {} (weight {})", regulation, regulation_weight);
            println!("Class:            {} (weight {})", class, class_weight);
            println!("Combined weight:  {}", (class_weight + regulation_weight) / 2.0);
            Ok(())
        }
        Commands::Table { table } => {
            let table = ReferenceTable::load(&table)?;
            let stats = table.stats();
            println!("Rows:            {}", stats.rows);
            println!("Unique domains:  {}", stats.unique_domains);
            println!("Duplicates:      {} (ignored, first row wins)", stats.duplicates);

            println!("\nBy class:");
            for (tag, count) in sorted_counts(&stats.by_class) {
                println!("  {:<14} {}", tag, count);
            }
            println!("\nBy regulation:");
            for (tag, count) in sorted_counts(&stats.by_regulation) {
                println!("  {:<14} {}", tag, count);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn collect_queries(
    mut queries: Vec<String>,
    from_file: Option<&std::path::Path>,
) -> Result<Vec<String>> {
    if let Some(path) = from_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?;
        queries.extend(
            raw.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }
    Ok(queries)
}

fn batch_progress(total: usize) -> Result<Option<ProgressBar>> {
    if total <= 1 {
        return Ok(None);
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(Some(pb))
}

fn report(scores: &[QueryScore], csv: Option<&std::path::Path>) -> Result<()> {
    for score in scores {
        output::print_report(score);
    }
    if let Some(path) = csv {
        output::write_csv(scores, path)?;
        let rows: usize = scores.iter().map(|s| s.results.len().min(10)).sum();
        println!("\nWrote {} result rows to {}", rows, path.display());
    }
    Ok(())
}

fn sorted_counts(counts: &std::collections::HashMap<String, usize>) -> Vec<(&str, usize)> {
    let mut pairs: Vec<(&str, usize)> = counts.iter().map(|(t, &c)| (t.as_str(), c)).collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    pairs
}

fn file_stem(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
