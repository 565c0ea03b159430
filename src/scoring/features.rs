use serde_json::Value;

use crate::serp::SerpData;

/// Placeholder recorded when a feature item carries no link field.
pub const NO_LINK: &str = "No link";

/// The five auxiliary SERP feature categories that factor into scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Ads,
    RelatedQuestions,
    AnswerBox,
    DiscussionsAndForums,
    KnowledgeGraph,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::Ads,
        FeatureKind::RelatedQuestions,
        FeatureKind::AnswerBox,
        FeatureKind::DiscussionsAndForums,
        FeatureKind::KnowledgeGraph,
    ];

    /// Display label for reports.
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Ads => "Sponsored Ads",
            FeatureKind::RelatedQuestions => "People Also Ask",
            FeatureKind::AnswerBox => "Answer Box",
            FeatureKind::DiscussionsAndForums => "Discussion and Forums",
            FeatureKind::KnowledgeGraph => "Knowledge Graph",
        }
    }
}

/// Count and outbound links for one feature kind.
#[derive(Debug, Clone)]
pub struct FeatureBlock {
    pub kind: FeatureKind,
    pub count: usize,
    pub links: Vec<String>,
}

/// One block per kind, always all five present even at zero count.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    blocks: [FeatureBlock; 5],
}

impl FeatureSet {
    pub fn get(&self, kind: FeatureKind) -> &FeatureBlock {
        &self.blocks[kind as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureBlock> {
        self.blocks.iter()
    }
}

/// Scan the SERP document for feature blocks.
///
/// A list-valued field counts its items and collects their links in document
/// order (no deduplication). An object-valued field (answer box, knowledge
/// graph) counts 1 with no links. An absent field counts 0.
pub fn extract(serp: &SerpData) -> FeatureSet {
    let blocks = FeatureKind::ALL.map(|kind| block_for(kind, field(serp, kind)));
    FeatureSet { blocks }
}

fn field(serp: &SerpData, kind: FeatureKind) -> Option<&Value> {
    match kind {
        FeatureKind::Ads => serp.ads.as_ref(),
        FeatureKind::RelatedQuestions => serp.related_questions.as_ref(),
        FeatureKind::AnswerBox => serp.answer_box.as_ref(),
        FeatureKind::DiscussionsAndForums => serp.discussions_and_forums.as_ref(),
        FeatureKind::KnowledgeGraph => serp.knowledge_graph.as_ref(),
    }
}

fn block_for(kind: FeatureKind, value: Option<&Value>) -> FeatureBlock {
    match value {
        Some(Value::Array(items)) => {
            let links: Vec<String> = items
                .iter()
                .map(|item| {
                    item.get("link")
                        .and_then(Value::as_str)
                        .unwrap_or(NO_LINK)
                        .to_string()
                })
                .collect();
            FeatureBlock { kind, count: links.len(), links }
        }
        Some(Value::Object(_)) => FeatureBlock { kind, count: 1, links: Vec::new() },
        _ => FeatureBlock { kind, count: 0, links: Vec::new() },
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn serp(value: Value) -> SerpData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn all_kinds_present_even_when_absent_from_document() {
        let features = extract(&serp(json!({ "organic_results": [] })));
        for kind in FeatureKind::ALL {
            let block = features.get(kind);
            assert_eq!(block.count, 0);
            assert!(block.links.is_empty());
        }
    }

    #[test]
    fn list_fields_count_items_and_collect_links() {
        let features = extract(&serp(json!({
            "ads": [
                { "link": "https://ad-one.example/a" },
                { "title": "no link on this one" },
                { "link": "https://ad-two.example/b" },
            ],
            "related_questions": [
                { "link": "https://paa.example/q1" },
            ],
        })));

        let ads = features.get(FeatureKind::Ads);
        assert_eq!(ads.count, 3);
        assert_eq!(ads.links.len(), 3);
        assert_eq!(ads.links[0], "https://ad-one.example/a");
        assert_eq!(ads.links[1], NO_LINK);
        assert_eq!(ads.links[2], "https://ad-two.example/b");

        assert_eq!(features.get(FeatureKind::RelatedQuestions).count, 1);
    }

    #[test]
    fn object_fields_count_one_with_no_links() {
        let features = extract(&serp(json!({
            "knowledge_graph": { "title": "Some Entity", "website": "https://entity.example" },
            "answer_box": { "answer": "42", "link": "https://answers.example" },
        })));

        for kind in [FeatureKind::KnowledgeGraph, FeatureKind::AnswerBox] {
            let block = features.get(kind);
            assert_eq!(block.count, 1);
            assert!(block.links.is_empty());
        }
    }

    #[test]
    fn count_matches_links_for_list_kinds() {
        let features = extract(&serp(json!({
            "ads": [{ "link": "https://a.example" }, {}],
            "discussions_and_forums": [
                { "link": "https://forum.example/t/1" },
                { "link": "https://forum.example/t/2" },
                { "link": "https://forum.example/t/1" },
            ],
        })));

        for block in features.iter() {
            match block.kind {
                FeatureKind::AnswerBox | FeatureKind::KnowledgeGraph => {
                    assert!(block.count <= 1);
                    assert!(block.links.is_empty());
                }
                _ => assert_eq!(block.count, block.links.len()),
            }
        }
        // Document order, no deduplication
        let forums = features.get(FeatureKind::DiscussionsAndForums);
        assert_eq!(forums.links[0], forums.links[2]);
    }
}
