//! URL handling for index sources and scraped permalinks.

use keigo_core::Error;
use url::Url;

/// Canonicalize a source URL.
///
/// Whitespace is trimmed, `https://` is assumed when no scheme is given, the
/// host is lowercased and the fragment dropped. Only http(s) is accepted.
pub fn canonicalize(input: &str) -> Result<Url, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty URL".into()));
    }

    let with_scheme = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    let mut parsed = Url::parse(&with_scheme).map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("unsupported scheme: {}", parsed.scheme())));
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed.set_host(Some(&host)).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    }
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve an `href` found on `base` into a site permalink.
///
/// Same-origin links become a root-relative path (with query), so scraped
/// documents match the permalinks the JSON index uses. Cross-origin links stay
/// absolute. Unresolvable or non-http links yield `None`.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);

    if resolved.origin() == base.origin() {
        let mut path = resolved.path().to_string();
        if let Some(query) = resolved.query() {
            path.push('?');
            path.push_str(query);
        }
        Some(path)
    } else {
        Some(resolved.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_defaults_scheme_and_lowercases_host() {
        let url = canonicalize("  KEIGO.example/index.json#top ").unwrap();
        assert_eq!(url.as_str(), "https://keigo.example/index.json");
    }

    #[test]
    fn test_canonicalize_preserves_query() {
        let url = canonicalize("http://keigo.example/search.json?v=2&lang=ja").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.query(), Some("v=2&lang=ja"));
    }

    #[test]
    fn test_canonicalize_rejects() {
        assert!(matches!(canonicalize(""), Err(Error::InvalidUrl(_))));
        assert!(matches!(canonicalize("   "), Err(Error::InvalidUrl(_))));
        assert!(matches!(canonicalize("file:///etc/passwd"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_resolve_link_same_origin() {
        let base = Url::parse("https://keigo.example/posts/").unwrap();
        assert_eq!(resolve_link(&base, "sonkeigo/").as_deref(), Some("/posts/sonkeigo/"));
        assert_eq!(resolve_link(&base, "/tags/?t=1#x").as_deref(), Some("/tags/?t=1"));
    }

    #[test]
    fn test_resolve_link_cross_origin_and_invalid() {
        let base = Url::parse("https://keigo.example/").unwrap();
        assert_eq!(resolve_link(&base, "https://other.example/a").as_deref(), Some("https://other.example/a"));
        assert_eq!(resolve_link(&base, "#section"), None);
        assert_eq!(resolve_link(&base, "mailto:hi@keigo.example"), None);
        assert_eq!(resolve_link(&base, ""), None);
    }
}
