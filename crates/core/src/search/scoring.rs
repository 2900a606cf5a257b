//! Weighted field-match scoring.

use super::document::Document;
use serde::{Deserialize, Serialize};

/// Points awarded per kind of match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Title equals the whole query.
    pub exact_title: u32,
    /// Title contains the whole query.
    pub title_phrase: u32,
    /// Title contains a token.
    pub title_token: u32,
    /// Any textual field contains a token.
    pub text_token: u32,
    /// Some category contains a token.
    pub category_token: u32,
    /// Some tag contains a token.
    pub tag_token: u32,
}

impl ScoringWeights {
    pub const EXACT_TITLE: u32 = 100;
    pub const TITLE_PHRASE: u32 = 50;
    pub const TITLE_TOKEN: u32 = 20;
    pub const TEXT_TOKEN: u32 = 10;
    pub const CATEGORY_TOKEN: u32 = 15;
    pub const TAG_TOKEN: u32 = 15;
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_title: Self::EXACT_TITLE,
            title_phrase: Self::TITLE_PHRASE,
            title_token: Self::TITLE_TOKEN,
            text_token: Self::TEXT_TOKEN,
            category_token: Self::CATEGORY_TOKEN,
            tag_token: Self::TAG_TOKEN,
        }
    }
}

/// Score one document against a folded phrase and its folded tokens.
///
/// The exact-title and title-phrase bonuses stack. The sum saturates at
/// `u32::MAX`, so configured weights can't overflow it.
pub fn score(doc: &Document, phrase: &str, tokens: &[String], weights: &ScoringWeights) -> u32 {
    let mut total = 0u32;

    if doc.folded_title == phrase {
        total = total.saturating_add(weights.exact_title);
    }
    if doc.folded_title.contains(phrase) {
        total = total.saturating_add(weights.title_phrase);
    }

    for token in tokens {
        let token = token.as_str();
        if doc.folded_title.contains(token) {
            total = total.saturating_add(weights.title_token);
        }
        if doc.searchable_text.contains(token) {
            total = total.saturating_add(weights.text_token);
        }
        if doc.folded_categories.iter().any(|c| c.contains(token)) {
            total = total.saturating_add(weights.category_token);
        }
        if doc.folded_tags.iter().any(|t| t.contains(token)) {
            total = total.saturating_add(weights.tag_token);
        }
    }

    total
}
