//! Case folding, token highlighting, and snippet windows.
//!
//! All offsets here are in `char`s. Folding maps each char to exactly one
//! char, so a position found in folded text is the same position in the
//! original text.

use serde::{Deserialize, Serialize};

/// Markers wrapped around each highlighted token occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Highlighter {
    pub open: String,
    pub close: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self { open: "<mark>".into(), close: "</mark>".into() }
    }
}

/// Snippet window sizes, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetWindow {
    /// Characters kept before the match.
    pub before: usize,
    /// Characters kept after the end of the match.
    pub after: usize,
    /// Length of the leading excerpt used when nothing matches.
    pub fallback_len: usize,
}

impl SnippetWindow {
    pub const BEFORE: usize = 50;
    pub const AFTER: usize = 100;
    pub const FALLBACK_LEN: usize = 150;
}

impl Default for SnippetWindow {
    fn default() -> Self {
        Self { before: Self::BEFORE, after: Self::AFTER, fallback_len: Self::FALLBACK_LEN }
    }
}

const ELLIPSIS: &str = "...";

/// Lowercase a single char, keeping a one-to-one char mapping.
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Case-fold a string char by char.
pub fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Split a query into folded, whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(fold).collect()
}

/// Position of the first occurrence of `needle` in `haystack` at or after `from`.
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Wrap every occurrence of every token in `text` with the highlight markers.
///
/// Overlapping or touching occurrences are merged into one marked span.
pub fn highlight(text: &str, tokens: &[String], marker: &Highlighter) -> String {
    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold_char).collect();

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for token in tokens {
        let needle: Vec<char> = token.chars().collect();
        let mut from = 0;
        while let Some(start) = find_from(&folded, &needle, from) {
            spans.push((start, start + needle.len()));
            from = start + needle.len();
        }
    }

    if spans.is_empty() {
        return text.to_string();
    }

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len() + merged.len() * (marker.open.len() + marker.close.len()));
    let mut cursor = 0;
    for (start, end) in merged {
        out.extend(&chars[cursor..start]);
        out.push_str(&marker.open);
        out.extend(&chars[start..end]);
        out.push_str(&marker.close);
        cursor = end;
    }
    out.extend(&chars[cursor..]);
    out
}

/// Build a highlighted excerpt of `source` around the query.
///
/// Looks for the whole `phrase` first, then for each token in query order.
/// With no match at all, returns the first `fallback_len` chars plus `...`,
/// so an empty source yields just `...`.
pub fn snippet(source: &str, phrase: &str, tokens: &[String], window: &SnippetWindow, marker: &Highlighter) -> String {
    let chars: Vec<char> = source.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold_char).collect();

    let locate = |needle: &str| {
        let needle: Vec<char> = needle.chars().collect();
        find_from(&folded, &needle, 0).map(|start| (start, needle.len()))
    };

    let Some((start, len)) = locate(phrase).or_else(|| tokens.iter().find_map(|token| locate(token.as_str()))) else {
        let excerpt: String = chars.iter().take(window.fallback_len).collect();
        return format!("{excerpt}{ELLIPSIS}");
    };

    let from = start.saturating_sub(window.before);
    let to = (start + len).saturating_add(window.after).min(chars.len());
    let excerpt: String = chars[from..to].iter().collect();

    let mut out = String::new();
    if from > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(&highlight(&excerpt, tokens, marker));
    if to < chars.len() {
        out.push_str(ELLIPSIS);
    }
    out
}
