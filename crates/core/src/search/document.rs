//! Searchable documents and their tolerant ingestion.

use super::highlight::fold;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document record as delivered by the site index.
///
/// Every field defaults to empty so a record missing fields still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct RawDocument {
    pub title: String,
    pub body: String,
    pub summary: String,
    pub permalink: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub date: String,
}

impl RawDocument {
    /// Build a record from loosely shaped JSON, field by field.
    ///
    /// `content` is accepted in place of `body`. Scalar values are stringified
    /// and a single string category/tag becomes a one-element list; anything
    /// unusable becomes the empty default.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).map(text_of).unwrap_or_default();
        let body = match value.get("body").map(text_of) {
            Some(body) if !body.is_empty() => body,
            _ => field("content"),
        };

        Self {
            title: field("title"),
            body,
            summary: field("summary"),
            permalink: field("permalink"),
            categories: value.get("categories").map(list_of).unwrap_or_default(),
            tags: value.get("tags").map(list_of).unwrap_or_default(),
            date: field("date"),
        }
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn list_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(text_of).filter(|s| !s.is_empty()).collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// An ingested document with its folded search fields precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub title: String,
    pub body: String,
    pub summary: String,
    pub permalink: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub date: String,
    #[serde(skip)]
    pub(crate) folded_title: String,
    #[serde(skip)]
    pub(crate) folded_categories: Vec<String>,
    #[serde(skip)]
    pub(crate) folded_tags: Vec<String>,
    #[serde(skip)]
    pub(crate) searchable_text: String,
}

impl Document {
    /// Folded concatenation of every textual field, fixed at ingestion.
    pub fn searchable_text(&self) -> &str {
        &self.searchable_text
    }

    /// Text the snippet is cut from: the body, or the summary when the body is empty.
    pub fn snippet_source(&self) -> &str {
        if self.body.trim().is_empty() { &self.summary } else { &self.body }
    }
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let categories = dedup(raw.categories);
        let tags = dedup(raw.tags);

        let labels = [categories.join(" "), tags.join(" ")];
        let searchable_text = fold(
            &[raw.title.as_str(), raw.body.as_str(), raw.summary.as_str(), labels[0].as_str(), labels[1].as_str()]
                .join(" "),
        );

        Self {
            folded_title: fold(&raw.title),
            folded_categories: categories.iter().map(|c| fold(c)).collect(),
            folded_tags: tags.iter().map(|t| fold(t)).collect(),
            searchable_text,
            title: raw.title,
            body: raw.body,
            summary: raw.summary,
            permalink: raw.permalink,
            categories,
            tags,
            date: raw.date,
        }
    }
}

/// Drop repeated labels, keeping first-seen order.
fn dedup(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}
