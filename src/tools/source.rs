//! Loading tool inputs from URLs or local paths.

use crate::error::{Result, SvarError};
use std::path::Path;
use tracing::{debug, instrument};

/// Content loaded from a URL or a local path.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// Best-effort file name (from Content-Disposition, the URL path, or the path).
    pub name: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// MIME type reported by the server, if any.
    pub content_type: Option<String>,
}

impl LoadedSource {
    /// Lowercased extension of [`LoadedSource::name`], if it has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Whether the input looks like an http(s) URL.
pub fn is_url(source: &str) -> bool {
    url::Url::parse(source.trim()).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Fetches tool inputs over HTTP or from disk.
#[derive(Clone)]
pub struct SourceLoader {
    http: reqwest::Client,
}

impl SourceLoader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Load a URL or a local path into memory.
    #[instrument(skip(self))]
    pub async fn load(&self, source: &str) -> Result<LoadedSource> {
        let source = source.trim();
        if source.is_empty() {
            return Err(SvarError::InvalidInput("Empty file source".to_string()));
        }

        if is_url(source) {
            self.load_url(source).await
        } else {
            load_path(Path::new(source)).await
        }
    }

    async fn load_url(&self, source: &str) -> Result<LoadedSource> {
        let response = self.http.get(source).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SvarError::Tool(format!("GET {} returned {}", source, status)));
        }

        let headers = response.headers().clone();
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let name = headers
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename)
            .or_else(|| url_filename(source))
            .unwrap_or_else(|| "download".to_string());

        let bytes = response.bytes().await?.to_vec();
        debug!("Downloaded {} bytes as '{}'", bytes.len(), name);

        Ok(LoadedSource {
            name,
            bytes,
            content_type,
        })
    }
}

async fn load_path(path: &Path) -> Result<LoadedSource> {
    if !path.exists() {
        return Err(SvarError::InvalidInput(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    Ok(LoadedSource {
        name,
        bytes,
        content_type: None,
    })
}

/// Extract `filename=` from a Content-Disposition header value.
fn disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Last non-empty path segment of a URL.
fn url_filename(source: &str) -> Option<String> {
    let parsed = url::Url::parse(source).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/files/1"));
        assert!(is_url("http://localhost:8000/x"));
        assert!(!is_url("/tmp/file.py"));
        assert!(!is_url("data.csv"));
        assert!(!is_url("ftp://example.com/a"));
    }

    #[test]
    fn test_disposition_filename() {
        assert_eq!(
            disposition_filename(r#"attachment; filename="code.py""#).as_deref(),
            Some("code.py")
        );
        assert_eq!(disposition_filename("inline").as_deref(), None);
    }

    #[test]
    fn test_url_filename() {
        assert_eq!(
            url_filename("https://example.com/files/abc-123").as_deref(),
            Some("abc-123")
        );
        assert_eq!(url_filename("https://example.com/").as_deref(), None);
    }

    #[tokio::test]
    async fn test_load_url_uses_content_disposition() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/files/42")
            .with_status(200)
            .with_header("content-type", "text/x-python; charset=utf-8")
            .with_header("content-disposition", r#"attachment; filename="solve.py""#)
            .with_body("print('hi')")
            .create_async()
            .await;

        let loader = SourceLoader::new(reqwest::Client::new());
        let loaded = loader
            .load(&format!("{}/files/42", server.url()))
            .await
            .unwrap();

        assert_eq!(loaded.name, "solve.py");
        assert_eq!(loaded.extension().as_deref(), Some("py"));
        assert_eq!(loaded.content_type.as_deref(), Some("text/x-python"));
        assert_eq!(loaded.bytes, b"print('hi')");
    }

    #[tokio::test]
    async fn test_load_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        std::fs::write(&path, "hello").unwrap();

        let loader = SourceLoader::new(reqwest::Client::new());
        let loaded = loader.load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(loaded.extension().as_deref(), Some("txt"));
        assert_eq!(loaded.bytes, b"hello");
    }

    #[tokio::test]
    async fn test_load_missing_path() {
        let loader = SourceLoader::new(reqwest::Client::new());
        let err = loader.load("/definitely/not/here.bin").await.unwrap_err();
        assert!(matches!(err, SvarError::InvalidInput(_)));
    }
}
