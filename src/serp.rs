use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

const SERP_BASE_URL: &str = "https://serpapi.com/search";

/// Device profile the SERP is fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Device {
    Desktop,
    Tablet,
    Mobile,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Tablet => "tablet",
            Device::Mobile => "mobile",
        }
    }
}

/// Request parameters for one SERP fetch.
#[derive(Debug, Clone)]
pub struct SerpQuery {
    pub query: String,
    pub location: String,
    pub gl: String,
    pub device: Device,
    pub num: u32,
}

/// Search-results API client. One call per query, no retries: a non-success
/// response is a hard failure for that query alone.
pub struct SerpClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: SERP_BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERP_API_KEY")
            .map_err(|_| anyhow::anyhow!("SERP_API_KEY environment variable must be set"))?;
        Ok(Self::new(api_key))
    }

    pub async fn fetch(&self, params: &SerpQuery) -> Result<SerpData> {
        let num = params.num.to_string();
        let query = [
            ("api_key", self.api_key.as_str()),
            ("engine", "google"),
            ("q", params.query.as_str()),
            ("location", params.location.as_str()),
            ("hl", "en"),
            ("gl", params.gl.as_str()),
            ("device", params.device.as_str()),
            ("num", num.as_str()),
        ];

        info!("Fetching SERP for '{}' ({})", params.query, params.location);
        let response = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("SERP request failed for '{}'", params.query))?
            .error_for_status()
            .with_context(|| format!("SERP API rejected the request for '{}'", params.query))?;

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read SERP response for '{}'", params.query))?;
        serde_json::from_str(&body)
            .with_context(|| format!("Unparseable SERP document for '{}'", params.query))
    }
}

/// Parameters echoed back by the SERP API; used to label saved documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParameters {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One ranked organic result as it appears in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResult {
    pub position: u32,
    #[serde(default)]
    pub link: Option<String>,
}

/// Structured SERP document. Feature fields stay as raw JSON because their
/// shape varies per query (list of items vs single object vs absent).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpData {
    #[serde(default)]
    pub search_parameters: Option<SearchParameters>,
    #[serde(default)]
    pub organic_results: Vec<RawResult>,
    #[serde(default)]
    pub ads: Option<Value>,
    #[serde(default)]
    pub related_questions: Option<Value>,
    #[serde(default)]
    pub answer_box: Option<Value>,
    #[serde(default)]
    pub discussions_and_forums: Option<Value>,
    #[serde(default)]
    pub knowledge_graph: Option<Value>,
}

impl SerpData {
    /// Read a previously saved SERP document (offline scoring).
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SERP document {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Unparseable SERP document {}", path.display()))
    }

    /// Query string the document was fetched for, when the API echoed it.
    pub fn query_label(&self) -> Option<&str> {
        self.search_parameters.as_ref()?.q.as_deref()
    }

    pub fn location_label(&self) -> Option<&str> {
        self.search_parameters.as_ref()?.location.as_deref()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_document_deserializes() {
        let serp = SerpData::from_file(Path::new("tests/fixtures/casino_serp.json")).unwrap();
        assert_eq!(serp.organic_results.len(), 12);
        assert_eq!(serp.organic_results[0].position, 1);
        assert_eq!(
            serp.organic_results[0].link.as_deref(),
            Some("https://www.bet365.com/casino")
        );
        // Rank 7 carries no link field at all
        assert!(serp.organic_results[6].link.is_none());
        assert_eq!(serp.query_label(), Some("best online casino"));
        assert!(serp.ads.is_some());
        assert!(serp.knowledge_graph.is_some());
    }

    #[test]
    fn empty_document_defaults() {
        let serp: SerpData = serde_json::from_str("{}").unwrap();
        assert!(serp.organic_results.is_empty());
        assert!(serp.ads.is_none());
        assert!(serp.query_label().is_none());
    }
}
