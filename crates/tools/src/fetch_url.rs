//! FetchUrl tool — fetch a URL and reduce the HTML to readable text.
//!
//! The reduction is a regex pipeline, not a DOM parse: drop whole
//! script/style/nav/footer/header elements, strip the remaining tags,
//! decode the common entities, collapse to non-blank trimmed lines, and
//! hard-truncate. Good enough for feeding page text to a model; not a
//! browser.

use async_trait::async_trait;
use regex::Regex;
use rivet_core::tool::{Fragment, Tool};
use rivet_core::{TagMatch, TagScanner};
use tracing::debug;

const DOCS: &str = r#"<FetchUrl url="https://example.com/page" /> — fetch a web page and return its text content (title extracted, markup stripped, long pages truncated)."#;

const FETCH_TIMEOUT_SECS: u64 = 30;
const MAX_CONTENT_CHARS: usize = 10_000;

pub struct FetchUrlTool {
    client: reqwest::Client,
    scanner: TagScanner,
    drop_blocks: Vec<Regex>,
    title: Regex,
    tag: Regex,
}

impl FetchUrlTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let drop_blocks = ["script", "style", "nav", "footer", "header"]
            .iter()
            .map(|el| {
                Regex::new(&format!(r"(?is)<{el}\b.*?</{el}>"))
                    .expect("invalid element pattern")
            })
            .collect();

        Self {
            client,
            scanner: TagScanner::new("FetchUrl"),
            drop_blocks,
            title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("invalid title pattern"),
            tag: Regex::new(r"(?s)<[^>]+>").expect("invalid tag pattern"),
        }
    }

    /// Reduce raw HTML to `(title, text)`.
    fn html_to_text(&self, html: &str) -> (Option<String>, String) {
        let title = self
            .title
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty());

        let mut body = html.to_string();
        for re in &self.drop_blocks {
            body = re.replace_all(&body, "").into_owned();
        }
        let body = self.tag.replace_all(&body, "\n");
        let body = decode_entities(&body);

        let text = body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        (title, text)
    }

    fn truncate(text: String) -> String {
        if text.chars().count() <= MAX_CONTENT_CHARS {
            return text;
        }
        let mut cut: String = text.chars().take(MAX_CONTENT_CHARS).collect();
        cut.push_str("... (truncated)");
        cut
    }

    async fn fetch_one(&self, m: &TagMatch) -> (String, String) {
        let Some(url) = m.attr("url") else {
            return (
                "(Missing 'url' attribute)".into(),
                "❌ FetchUrl (missing 'url' attribute)".into(),
            );
        };

        debug!(url, "FetchUrl");

        let body = match self.fetch_body(url).await {
            Ok(b) => b,
            Err(e) => {
                return (
                    format!("=== Fetched: {url} ===\n(Failed to fetch: {e})"),
                    format!("❌ {url} (failed)"),
                );
            }
        };

        let (title, text) = self.html_to_text(&body);
        let text = Self::truncate(text);

        let detail = match title {
            Some(t) => format!("=== Fetched: {url} ===\nTitle: {t}\n\n{text}"),
            None => format!("=== Fetched: {url} ===\n{text}"),
        };
        (detail, format!("🌐 FETCHED {url}"))
    }

    async fn fetch_body(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl Default for FetchUrlTool {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &str {
        "FetchUrl"
    }

    fn docs(&self) -> &str {
        DOCS
    }

    async fn process(&self, turn_text: &str) -> Option<Fragment> {
        let matches: Vec<TagMatch> = self.scanner.scan(turn_text).collect();
        if matches.is_empty() {
            return None;
        }

        let mut details = Vec::new();
        let mut summaries = Vec::new();
        for m in &matches {
            let (detail, summary) = self.fetch_one(m).await;
            details.push(detail);
            summaries.push(summary);
        }

        Some(Fragment {
            detail: details.join("\n\n"),
            summary: summaries.join("\n"),
        })
    }
}
