//! In-memory relevance search over the site's document collection.
//!
//! A linear scan with weighted field matching. Documents are folded once at
//! load time; each query folds the input, scores every document, keeps the
//! positive scores, and renders highlighted titles and snippets for the hits
//! it returns.

pub mod document;
pub mod highlight;
pub mod scoring;

pub use document::{Document, RawDocument};
pub use highlight::{Highlighter, SnippetWindow};
pub use scoring::ScoringWeights;

use chrono::{DateTime, Utc};
use highlight::{fold, tokenize};
use serde::{Deserialize, Serialize};

/// Default result cap for [`RelevanceSearch::query`] callers.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Overridable knobs for scoring and rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTuning {
    pub weights: ScoringWeights,
    pub snippet: SnippetWindow,
    pub highlight: Highlighter,
}

/// A ranked hit with its rendered fields.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    pub document: &'a Document,
    pub score: u32,
    pub highlighted_title: String,
    pub snippet: String,
}

/// Relevance scorer over a replaceable document collection.
#[derive(Debug, Clone, Default)]
pub struct RelevanceSearch {
    documents: Vec<Document>,
    tuning: SearchTuning,
    loaded_at: Option<DateTime<Utc>>,
}

impl RelevanceSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: SearchTuning) -> Self {
        Self { tuning, ..Self::default() }
    }

    /// Replace the whole collection.
    pub fn load(&mut self, documents: impl IntoIterator<Item = RawDocument>) {
        self.documents = documents.into_iter().map(Document::from).collect();
        self.loaded_at = Some(Utc::now());
        tracing::debug!(documents = self.documents.len(), "search collection loaded");
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// When the current collection was loaded, if ever.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn tuning(&self) -> &SearchTuning {
        &self.tuning
    }

    /// Rank documents against `text`, best first, at most `max_results`.
    ///
    /// Blank input and an empty collection both yield no results. Equal
    /// scores keep collection order.
    pub fn query(&self, text: &str, max_results: usize) -> Vec<SearchResult<'_>> {
        let tokens = tokenize(text);
        if tokens.is_empty() || max_results == 0 {
            return Vec::new();
        }
        let phrase = fold(text.trim());
        let tuning = &self.tuning;

        let mut scored: Vec<(&Document, u32)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let score = scoring::score(doc, &phrase, &tokens, &tuning.weights);
                (score > 0).then_some((doc, score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(max_results);

        scored
            .into_iter()
            .map(|(document, score)| SearchResult {
                document,
                score,
                highlighted_title: highlight::highlight(&document.title, &tokens, &tuning.highlight),
                snippet: highlight::snippet(
                    document.snippet_source(),
                    &phrase,
                    &tokens,
                    &tuning.snippet,
                    &tuning.highlight,
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> RawDocument {
        RawDocument { title: title.into(), ..Default::default() }
    }

    #[test]
    fn test_exact_title_ranks_first() {
        let mut search = RelevanceSearch::new();
        search.load(vec![titled("敬語入門とビジネス"), titled("敬語入門")]);

        let results = search.query("敬語入門", DEFAULT_MAX_RESULTS);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.title, "敬語入門");
        assert_eq!(results[0].score, 180);
        assert_eq!(results[1].document.title, "敬語入門とビジネス");
        assert_eq!(results[1].score, 80);
    }

    #[test]
    fn test_blank_query_is_empty() {
        let mut search = RelevanceSearch::new();
        search.load(vec![titled("敬語")]);
        assert!(search.query("", 20).is_empty());
        assert!(search.query("   ", 20).is_empty());
        assert!(search.query("\t\n", 20).is_empty());
    }

    #[test]
    fn test_nothing_loaded() {
        let search = RelevanceSearch::new();
        assert!(search.query("敬語", 20).is_empty());
        assert!(search.loaded_at().is_none());
    }

    #[test]
    fn test_result_cap() {
        let mut search = RelevanceSearch::new();
        search.load((0..100).map(|i| titled(&format!("test document {i}"))));

        assert_eq!(search.query("test", 5).len(), 5);
        assert_eq!(search.query("test", 500).len(), 100);
        assert!(search.query("test", 0).is_empty());
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let mut search = RelevanceSearch::new();
        search.load((0..10).map(|i| RawDocument {
            title: format!("doc {i}"),
            body: "丁寧語".into(),
            ..Default::default()
        }));

        let titles: Vec<_> = search.query("丁寧語", 20).iter().map(|r| r.document.title.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("doc {i}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_zero_scores_discarded() {
        let mut search = RelevanceSearch::new();
        search.load(vec![titled("尊敬語"), titled("謙譲語")]);
        let results = search.query("尊敬語", 20);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.title, "尊敬語");
    }

    #[test]
    fn test_rendered_fields() {
        let mut search = RelevanceSearch::new();
        search.load(vec![RawDocument {
            title: "Keigo for Business Email".into(),
            body: "Writing business email in keigo requires care.".into(),
            ..Default::default()
        }]);

        let results = search.query("business EMAIL", 20);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].highlighted_title, "Keigo for <mark>Business</mark> <mark>Email</mark>");
        assert_eq!(results[0].snippet, "Writing <mark>business</mark> <mark>email</mark> in keigo requires care.");
    }

    #[test]
    fn test_snippet_falls_back_to_leading_excerpt() {
        let mut search = RelevanceSearch::new();
        let body = "あ".repeat(200);
        search.load(vec![RawDocument { title: "敬語".into(), body: body.clone(), ..Default::default() }]);

        let results = search.query("敬語", 20);
        assert_eq!(results[0].snippet, format!("{}...", "あ".repeat(150)));
    }

    #[test]
    fn test_malformed_documents_still_load() {
        let mut search = RelevanceSearch::new();
        let values = [serde_json::json!({"title": "尊敬語"}), serde_json::json!(null), serde_json::json!({"tags": 3})];
        search.load(values.iter().map(RawDocument::from_value));

        assert_eq!(search.len(), 3);
        assert_eq!(search.query("尊敬語", 20).len(), 1);
    }

    #[test]
    fn test_reload_replaces_collection() {
        let mut search = RelevanceSearch::new();
        search.load(vec![titled("古い記事")]);
        search.load(vec![titled("新しい記事")]);

        assert_eq!(search.len(), 1);
        assert!(search.query("古い", 20).is_empty());
        assert_eq!(search.query("新しい", 20).len(), 1);
    }

    #[test]
    fn test_custom_tuning() {
        let tuning = SearchTuning {
            highlight: Highlighter { open: "**".into(), close: "**".into() },
            ..Default::default()
        };
        let mut search = RelevanceSearch::with_tuning(tuning);
        search.load(vec![titled("謙譲語の例")]);

        assert_eq!(search.query("謙譲語", 20)[0].highlighted_title, "**謙譲語**の例");
    }

    #[test]
    fn test_configured_max_weight_does_not_overflow() {
        let config = crate::AppConfig::from_toml("[search.weights]\nexact_title = 4294967295\n").unwrap();
        let mut search = RelevanceSearch::with_tuning(config.search);
        search.load(vec![titled("敬語"), titled("敬語とは")]);

        let results = search.query("敬語", 20);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.title, "敬語");
        assert_eq!(results[0].score, u32::MAX);
    }

    #[test]
    fn test_title_only_document_snippet() {
        let mut search = RelevanceSearch::new();
        search.load(vec![titled("謙譲語")]);

        let results = search.query("謙譲語", 20);
        assert_eq!(results[0].snippet, "...");
    }
}
