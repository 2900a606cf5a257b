//! Fallback source: article cards scraped from a rendered HTML page.

use super::DocumentSource;
use crate::fetch::{FetchClient, resolve_link};
use keigo_core::{Error, RawDocument};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, OnceLock};
use url::Url;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("invalid regex"))
}

/// Text of an element with runs of whitespace collapsed.
fn text_of(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    whitespace().replace_all(raw.trim(), " ").into_owned()
}

fn first_text(scope: ElementRef<'_>, css: &str) -> String {
    scope.select(&selector(css)).map(text_of).find(|t| !t.is_empty()).unwrap_or_default()
}

fn all_texts(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    scope.select(&selector(css)).map(text_of).filter(|t| !t.is_empty()).collect()
}

/// Extract article cards from an HTML page.
///
/// Each `article` or `.post` node becomes one document: title from the first
/// heading or `.post-title`, permalink from the heading link (else the first
/// link), summary from `.summary` or the first paragraph, body from a content
/// container or all paragraphs, labels from `.category`/`rel=category` and
/// `.tag`/`rel=tag`, date from `time[datetime]`. Cards with neither title nor
/// permalink are dropped.
pub fn scrape_articles(html: &str, base_url: &Url) -> Vec<RawDocument> {
    let document = Html::parse_document(html);
    let cards = selector("article, .post");
    let heading_link = selector("h1 a[href], h2 a[href], h3 a[href], .post-title a[href]");
    let any_link = selector("a[href]");
    let content = selector(".content, .post-content, .entry-content");
    let time = selector("time");

    let mut documents = Vec::new();
    for card in document.select(&cards) {
        let title = first_text(card, "h1, h2, h3, .post-title");
        let permalink = card
            .select(&heading_link)
            .chain(card.select(&any_link))
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| resolve_link(base_url, href))
            .unwrap_or_default();

        if title.is_empty() && permalink.is_empty() {
            continue;
        }

        let body = match card.select(&content).next() {
            Some(node) => text_of(node),
            None => all_texts(card, "p").join(" "),
        };
        let date = card
            .select(&time)
            .next()
            .map(|t| t.value().attr("datetime").map(str::to_string).unwrap_or_else(|| text_of(t)))
            .unwrap_or_default();

        documents.push(RawDocument {
            title,
            summary: first_text(card, ".summary, p"),
            body,
            permalink,
            categories: all_texts(card, ".category, a[rel~=category]"),
            tags: all_texts(card, ".tag, a[rel~=tag]"),
            date,
        });
    }
    documents
}

/// HTML page scraped for article cards.
pub struct ScrapedPageSource {
    url: String,
    fetch: Arc<FetchClient>,
}

impl ScrapedPageSource {
    pub fn new(url: impl Into<String>, fetch: Arc<FetchClient>) -> Self {
        Self { url: url.into(), fetch }
    }
}

#[async_trait::async_trait]
impl DocumentSource for ScrapedPageSource {
    fn name(&self) -> String {
        format!("scrape:{}", self.url)
    }

    async fn load(&self) -> Result<Vec<RawDocument>, Error> {
        let response = self.fetch.fetch(&self.url, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8").await?;
        let documents = scrape_articles(&response.text(), &response.final_url);
        if documents.is_empty() {
            return Err(Error::IndexUnavailable(format!("no articles found on {}", response.final_url)));
        }
        tracing::info!(documents = documents.len(), url = %response.final_url, "scraped fallback page");
        Ok(documents)
    }
}
