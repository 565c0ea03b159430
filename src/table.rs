use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

/// Fallback tag for anything the table does not cover.
pub const DEFAULT_TAG: &str = "Other";

/// One row of the domain reference table. `domain` is already normalized.
#[derive(Debug, Clone)]
pub struct ReferenceEntry {
    pub domain: String,
    pub regulation: String,
    pub class: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Domain")]
    domain: String,
    #[serde(rename = "Regulation", default)]
    regulation: String,
    #[serde(rename = "Class", default)]
    class: String,
}

/// Domain → (regulation, class) lookup, loaded once and immutable after.
///
/// Duplicate domains are allowed in the source file; the first row wins.
#[derive(Debug)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl ReferenceTable {
    /// Load a CSV table with a `Domain` column (plus `Regulation`, `Class`).
    /// Domains are normalized at load; blank tag cells default to "Other".
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open reference table {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?;
        if !headers.iter().any(|h| h == "Domain") {
            anyhow::bail!("Reference table {} has no 'Domain' column", path.display());
        }

        let mut entries = Vec::new();
        for row in reader.deserialize() {
            let raw: RawRow = row
                .with_context(|| format!("Malformed row in {}", path.display()))?;
            entries.push(ReferenceEntry {
                domain: normalize_domain(&raw.domain),
                regulation: tag_or_default(raw.regulation),
                class: tag_or_default(raw.class),
            });
        }

        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ReferenceEntry>) -> Self {
        let mut index = HashMap::new();
        let mut duplicates = 0;
        for (i, entry) in entries.iter().enumerate() {
            // First match wins; later rows for the same domain are ignored.
            if index.contains_key(&entry.domain) {
                duplicates += 1;
            } else {
                index.insert(entry.domain.clone(), i);
            }
        }
        Self { entries, index, duplicates }
    }

    /// Tags for a domain, or ("Other", "Other") when unmapped.
    /// Normalizes its argument, so raw hosts like "www.EXAMPLE.com" match.
    pub fn lookup(&self, domain: &str) -> (&str, &str) {
        let key = normalize_domain(domain);
        match self.index.get(&key) {
            Some(&i) => {
                let e = &self.entries[i];
                (&e.regulation, &e.class)
            }
            None => (DEFAULT_TAG, DEFAULT_TAG),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> TableStats {
        let mut by_class: HashMap<String, usize> = HashMap::new();
        let mut by_regulation: HashMap<String, usize> = HashMap::new();
        for &i in self.index.values() {
            let e = &self.entries[i];
            *by_class.entry(e.class.clone()).or_default() += 1;
            *by_regulation.entry(e.regulation.clone()).or_default() += 1;
        }
        TableStats {
            rows: self.entries.len(),
            unique_domains: self.index.len(),
            duplicates: self.duplicates,
            by_class,
            by_regulation,
        }
    }
}

/// Summary for the `table` subcommand.
pub struct TableStats {
    pub rows: usize,
    pub unique_domains: usize,
    pub duplicates: usize,
    pub by_class: HashMap<String, usize>,
    pub by_regulation: HashMap<String, usize>,
}

/// Host of a URL, lowercased, with a leading "www." stripped.
/// Unparseable URLs yield an empty string, which matches no table entry.
pub fn url_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(normalize_domain))
        .unwrap_or_default()
}

/// Normalize a bare host string the same way table domains are normalized.
pub fn normalize_domain(raw: &str) -> String {
    let host = raw.trim().to_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

fn tag_or_default(tag: String) -> String {
    let tag = tag.trim().to_string();
    if tag.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        tag
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_table() -> ReferenceTable {
        ReferenceTable::load(Path::new("tests/fixtures/reference.csv")).unwrap()
    }

    #[test]
    fn normalize_strips_www_and_case() {
        assert_eq!(normalize_domain("www.EXAMPLE.com"), "example.com");
        assert_eq!(normalize_domain("Bet365.COM"), "bet365.com");
        // Only a leading www. is stripped
        assert_eq!(normalize_domain("wwwx.example.com"), "wwwx.example.com");
    }

    #[test]
    fn url_domain_extracts_host() {
        assert_eq!(url_domain("https://www.Example.com/path?q=1"), "example.com");
        assert_eq!(url_domain("http://casino.org"), "casino.org");
    }

    #[test]
    fn url_domain_soft_fails() {
        assert_eq!(url_domain("not a url"), "");
        assert_eq!(url_domain(""), "");
        assert_eq!(url_domain("/relative/path"), "");
    }

    #[test]
    fn lookup_hits_and_misses() {
        let table = fixture_table();
        assert_eq!(table.lookup("bet365.com"), ("Regulated", "Operator"));
        assert_eq!(table.lookup("www.BET365.com"), ("Regulated", "Operator"));
        assert_eq!(table.lookup("nowhere.example"), ("Other", "Other"));
        assert_eq!(table.lookup(""), ("Other", "Other"));
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let table = fixture_table();
        // reference.csv lists casino.org twice with different tags
        assert_eq!(table.lookup("casino.org"), ("Unregulated", "Publisher"));
        assert!(table.stats().duplicates >= 1);
    }

    #[test]
    fn blank_cells_default_to_other() {
        let table = ReferenceTable::from_entries(vec![ReferenceEntry {
            domain: "x.com".into(),
            regulation: tag_or_default("  ".into()),
            class: tag_or_default(String::new()),
        }]);
        assert_eq!(table.lookup("x.com"), ("Other", "Other"));
    }

    #[test]
    fn missing_domain_column_is_an_error() {
        let err = ReferenceTable::load(Path::new("tests/fixtures/no_domain_column.csv"));
        assert!(err.is_err());
    }
}
