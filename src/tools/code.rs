//! Raw text reader for code, text and tabular files.

use super::source::{LoadedSource, SourceLoader};
use super::spreadsheet;
use crate::error::{Result, SvarError};
use tracing::instrument;

/// Bytes inspected when deciding whether content is binary.
const BINARY_SNIFF_LEN: usize = 8192;

/// Returns the raw text of a file without executing it.
pub struct CodeReader {
    loader: SourceLoader,
    max_chars: usize,
}

impl CodeReader {
    pub fn new(loader: SourceLoader, max_chars: usize) -> Self {
        Self { loader, max_chars }
    }

    #[instrument(skip(self))]
    pub async fn read(&self, source: &str) -> Result<String> {
        let loaded = self.loader.load(source).await?;

        if is_workbook(&loaded) {
            let text = spreadsheet::render_workbook(&loaded.name, loaded.bytes)?;
            return Ok(truncate_chars(&text, self.max_chars));
        }

        if looks_binary(&loaded.bytes) {
            return Err(SvarError::Tool(format!(
                "'{}' appears to be a binary file and cannot be read as text",
                loaded.name
            )));
        }

        let text = String::from_utf8_lossy(&loaded.bytes);
        Ok(truncate_chars(&text, self.max_chars))
    }
}

fn is_workbook(source: &LoadedSource) -> bool {
    spreadsheet::is_spreadsheet(source.extension().as_deref())
        || source
            .content_type
            .as_deref()
            .is_some_and(|t| t.contains("spreadsheet") || t.contains("ms-excel"))
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0)
}

/// Truncate to `max` characters, noting how much was dropped.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text.to_string();
    }

    let kept: String = text.chars().take(max).collect();
    format!("{}\n\n[truncated: {} of {} characters shown]", kept, max, total)
}
