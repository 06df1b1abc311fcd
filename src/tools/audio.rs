//! Speech-to-text for audio files.

use super::source::{LoadedSource, SourceLoader};
use crate::error::{Result, SvarError};
use crate::openai::OpenAIClient;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Extensions accepted by the transcription endpoint.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm",
];

/// Transcribes audio with the OpenAI transcription API.
pub struct AudioTranscriber {
    client: OpenAIClient,
    loader: SourceLoader,
    model: String,
}

impl AudioTranscriber {
    pub fn new(client: OpenAIClient, loader: SourceLoader, model: &str) -> Self {
        Self {
            client,
            loader,
            model: model.to_string(),
        }
    }

    /// Transcribe audio from a URL or path.
    #[instrument(skip(self))]
    pub async fn transcribe(&self, source: &str) -> Result<String> {
        let loaded = self.loader.load(source).await?;
        self.transcribe_loaded(loaded).await
    }

    /// Transcribe an audio file on disk.
    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        self.transcribe_loaded(LoadedSource {
            name,
            bytes,
            content_type: None,
        })
        .await
    }

    async fn transcribe_loaded(&self, loaded: LoadedSource) -> Result<String> {
        let file_name = upload_name(&loaded);
        info!("Transcribing {} ({} bytes) with {}", file_name, loaded.bytes.len(), self.model);

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                file_name,
                loaded.bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| SvarError::Tool(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("{} API error: {}", self.model, e)))?;

        let text = response.text.trim().to_string();
        debug!("Transcript has {} characters", text.len());

        if text.is_empty() {
            return Ok("(no speech detected)".to_string());
        }
        Ok(text)
    }
}

/// File name sent with the upload; the API infers the format from its extension.
fn upload_name(loaded: &LoadedSource) -> String {
    if let Some(ext) = loaded.extension() {
        if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return loaded.name.clone();
        }
    }

    let ext = match loaded.content_type.as_deref() {
        Some("audio/wav") | Some("audio/x-wav") => "wav",
        Some("audio/mp4") | Some("audio/x-m4a") => "m4a",
        Some("audio/ogg") => "ogg",
        Some("audio/flac") => "flac",
        Some("audio/webm") => "webm",
        _ => "mp3",
    };
    format!("{}.{}", loaded.name, ext)
}
