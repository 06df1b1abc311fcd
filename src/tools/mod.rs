//! Tool implementations available to the agent.
//!
//! Each tool is a stateless request/response adapter: it takes a URL, path
//! or query and returns text the language model can reason over.

mod audio;
mod code;
mod image;
pub mod source;
mod spreadsheet;
mod video;
mod vision;
mod web_search;
mod wikipedia;

pub use audio::AudioTranscriber;
pub use code::CodeReader;
pub use image::ImageReader;
pub use source::{is_url, LoadedSource, SourceLoader};
pub use video::VideoSampler;
pub use web_search::{parse_results, SearchHit, WebSearch};
pub use wikipedia::WikipediaSearch;

use crate::error::{Result, SvarError};
use std::time::Duration;

/// User agent sent by tool HTTP requests.
pub const USER_AGENT: &str = concat!("svar/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the tools.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SvarError::Config(format!("Failed to create HTTP client: {}", e)))
}
