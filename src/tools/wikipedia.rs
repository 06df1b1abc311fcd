//! Wikipedia search through the MediaWiki API.

use super::code::truncate_chars;
use crate::error::{Result, SvarError};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Searches Wikipedia and returns plain-text article extracts.
pub struct WikipediaSearch {
    http: reqwest::Client,
    endpoint: String,
    max_results: usize,
    max_chars: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaSearch {
    /// Create a search client for a language edition (e.g. "en").
    pub fn new(http: reqwest::Client, language: &str, max_results: usize, max_chars: usize) -> Self {
        Self::with_endpoint(
            http,
            &format!("https://{}.wikipedia.org/w/api.php", language),
            max_results,
            max_chars,
        )
    }

    /// Create a search client against an explicit api.php endpoint.
    pub fn with_endpoint(
        http: reqwest::Client,
        endpoint: &str,
        max_results: usize,
        max_chars: usize,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            max_results: max_results.max(1),
            max_chars,
        }
    }

    /// Search for `query` and return the top articles' text.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(SvarError::InvalidInput("Empty search query".to_string()));
        }

        let limit = self.max_results.to_string();
        let response: SearchResponse = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let titles: Vec<String> = response
            .query
            .map(|q| q.search.into_iter().map(|h| h.title).collect())
            .unwrap_or_default();

        if titles.is_empty() {
            return Ok(format!("No Wikipedia results found for '{}'.", query));
        }

        debug!("Wikipedia hits: {:?}", titles);

        let per_article = (self.max_chars / titles.len()).max(500);
        let mut sections = Vec::with_capacity(titles.len());

        for title in &titles {
            match self.extract(title).await {
                Ok(Some(page)) => sections.push(format!(
                    "## {}\n\n{}",
                    page.title,
                    truncate_chars(page.extract.as_deref().unwrap_or_default(), per_article)
                )),
                Ok(None) => {}
                Err(e) => sections.push(format!("## {}\n\n(failed to load article: {})", title, e)),
            }
        }

        Ok(format!(
            "Wikipedia results for '{}':\n\n{}",
            query,
            sections.join("\n\n")
        ))
    }

    async fn extract(&self, title: &str) -> Result<Option<Page>> {
        let response: ExtractResponse = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.query.and_then(|q| q.pages.into_iter().next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_search_returns_extracts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "search".into()),
                Matcher::UrlEncoded("srsearch".into(), "Mercedes Sosa".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"query": {"search": [{"title": "Mercedes Sosa"}]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prop".into(), "extracts".into()),
                Matcher::UrlEncoded("titles".into(), "Mercedes Sosa".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"query": {"pages": [{"title": "Mercedes Sosa",
                    "extract": "Haydée Mercedes Sosa was an Argentine singer."}]}}"#,
            )
            .create_async()
            .await;

        let wiki = WikipediaSearch::with_endpoint(
            reqwest::Client::new(),
            &format!("{}/w/api.php", server.url()),
            3,
            5000,
        );
        let text = wiki.search("Mercedes Sosa").await.unwrap();

        assert!(text.contains("## Mercedes Sosa"));
        assert!(text.contains("Argentine singer"));
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"query": {"search": []}}"#)
            .create_async()
            .await;

        let wiki = WikipediaSearch::with_endpoint(
            reqwest::Client::new(),
            &format!("{}/w/api.php", server.url()),
            3,
            5000,
        );
        let text = wiki.search("zzzz").await.unwrap();
        assert!(text.starts_with("No Wikipedia results"));
    }
}
