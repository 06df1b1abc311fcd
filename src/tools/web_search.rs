//! Web search via the DuckDuckGo HTML endpoint.

use crate::error::{Result, SvarError};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
        .expect("Invalid regex")
});

static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#).expect("Invalid regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search client.
pub struct WebSearch {
    http: reqwest::Client,
    endpoint: String,
    max_results: usize,
}

impl WebSearch {
    pub fn new(http: reqwest::Client, max_results: usize) -> Self {
        Self::with_endpoint(http, DEFAULT_ENDPOINT, max_results)
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: &str, max_results: usize) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            max_results: max_results.max(1),
        }
    }

    /// Search the web and format the top hits.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(SvarError::InvalidInput("Empty search query".to_string()));
        }

        let html = self
            .http
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let hits = parse_results(&html, self.max_results);
        debug!("Web search returned {} hits", hits.len());

        if hits.is_empty() {
            return Ok(format!("No web results found for '{}'.", query));
        }

        let formatted = hits
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{}. [{}]({})\n   {}", i + 1, h.title, h.url, h.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(format!("## Search Results\n\n{}", formatted))
    }
}

/// Parse result links and snippets from the HTML results page.
///
/// A snippet belongs to the link it follows, so each hit only looks for its
/// snippet between its own link and the next one.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let links: Vec<_> = RESULT_LINK.captures_iter(html).collect();

    links
        .iter()
        .enumerate()
        .take(max_results)
        .filter_map(|(i, caps)| {
            let link = caps.get(0)?;
            let block_end = links
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(html.len(), |next| next.start());

            let snippet = RESULT_SNIPPET
                .captures(&html[link.end()..block_end])
                .map(|c| clean_text(&c[1]))
                .unwrap_or_default();

            Some(SearchHit {
                title: clean_text(&caps[2]),
                url: resolve_redirect(&decode_entities(&caps[1])),
                snippet,
            })
        })
        .collect()
}

/// Unwrap DuckDuckGo's `/l/?uddg=` redirect links to the target URL.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    url::Url::parse(&absolute)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or(absolute)
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    decode_entities(stripped.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="result">
          <h2 class="result__title">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRust&amp;rut=abc">Rust <b>programming</b> language</a>
          </h2>
          <a class="result__snippet" href="x">Rust is a <b>general-purpose</b> language &amp; more.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://www.rust-lang.org/">Rust homepage</a>
          <a class="result__snippet" href="y">A language empowering everyone.</a>
        </div>
    "#;

    #[test]
    fn test_parse_results() {
        let hits = parse_results(SAMPLE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Rust programming language");
        assert_eq!(hits[0].url, "https://en.wikipedia.org/wiki/Rust");
        assert_eq!(hits[0].snippet, "Rust is a general-purpose language & more.");
        assert_eq!(hits[1].url, "https://www.rust-lang.org/");
    }

    #[test]
    fn test_snippet_stays_with_its_result() {
        let html = r#"
            <div class="result">
              <a class="result__a" href="https://a.example/">Page A</a>
            </div>
            <div class="result">
              <a class="result__a" href="https://b.example/">Page B</a>
              <a class="result__snippet" href="b">Snippet belonging to B</a>
            </div>
        "#;

        let hits = parse_results(html, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://a.example/");
        assert_eq!(hits[0].snippet, "");
        assert_eq!(hits[1].url, "https://b.example/");
        assert_eq!(hits[1].snippet, "Snippet belonging to B");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(parse_results(SAMPLE, 1).len(), 1);
        assert!(parse_results("<html></html>", 5).is_empty());
    }

    #[tokio::test]
    async fn test_search_against_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/html/")
            .match_body(mockito::Matcher::UrlEncoded("q".into(), "rust lang".into()))
            .with_status(200)
            .with_body(SAMPLE)
            .create_async()
            .await;

        let search = WebSearch::with_endpoint(
            reqwest::Client::new(),
            &format!("{}/html/", server.url()),
            5,
        );
        let text = search.search("rust lang").await.unwrap();
        assert!(text.contains("1. [Rust programming language](https://en.wikipedia.org/wiki/Rust)"));
    }
}
