//! Video understanding: sampled frames plus an optional audio transcript.

use super::audio::AudioTranscriber;
use super::source::{is_url, SourceLoader};
use super::vision::{data_uri, describe_images};
use crate::config::Prompts;
use crate::error::{Result, SvarError};
use crate::media::{self, frame_timestamps};
use crate::openai::OpenAIClient;
use async_openai::types::ImageDetail;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Samples frames from a video and describes them with a vision model.
pub struct VideoSampler {
    client: OpenAIClient,
    loader: SourceLoader,
    model: String,
    frame_count: u32,
    temp_dir: PathBuf,
    prompts: Prompts,
}

impl VideoSampler {
    pub fn new(
        client: OpenAIClient,
        loader: SourceLoader,
        model: &str,
        frame_count: u32,
        temp_dir: PathBuf,
        prompts: Prompts,
    ) -> Self {
        Self {
            client,
            loader,
            model: model.to_string(),
            frame_count: frame_count.max(1),
            temp_dir,
            prompts,
        }
    }

    /// Describe a video from a YouTube link, URL, or path.
    ///
    /// When `transcriber` is given the audio track is transcribed as well; a
    /// failed transcription is reported inline rather than failing the call.
    #[instrument(skip(self, transcriber))]
    pub async fn run(
        &self,
        source: &str,
        question: Option<&str>,
        transcriber: Option<&AudioTranscriber>,
    ) -> Result<String> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let work_dir = tempfile::tempdir_in(&self.temp_dir)?;

        let video_path = self.fetch_video(source, work_dir.path()).await?;
        let duration = media::probe_duration(&video_path).await?;
        info!("Sampling {} frames from {:.1}s of video", self.frame_count, duration);

        let mut frames = Vec::new();
        for (idx, ts) in frame_timestamps(duration, self.frame_count).into_iter().enumerate() {
            let frame_path = work_dir.path().join(format!("frame_{:03}.jpg", idx));
            media::extract_frame(&video_path, &frame_path, ts).await?;
            let bytes = tokio::fs::read(&frame_path).await?;
            frames.push(data_uri("image/jpeg", &bytes));
        }

        if frames.is_empty() {
            return Err(SvarError::Tool("No frames could be extracted".to_string()));
        }

        let mut vars = HashMap::new();
        vars.insert("frame_count".to_string(), frames.len().to_string());
        vars.insert("question".to_string(), question.unwrap_or_default().to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.tools.video, &vars);

        let description =
            describe_images(&self.client, &self.model, &prompt, frames, ImageDetail::Low).await?;

        let mut output = format!("Video duration: {:.0} seconds\n\nFrames:\n{}", duration, description);

        if let Some(transcriber) = transcriber {
            let audio_path = work_dir.path().join("audio.mp3");
            let transcript = match media::extract_audio(&video_path, &audio_path).await {
                Ok(()) => transcriber.transcribe_file(&audio_path).await,
                Err(e) => Err(e),
            };

            match transcript {
                Ok(text) => output.push_str(&format!("\n\nAudio transcript:\n{}", text)),
                Err(e) => {
                    warn!("Audio transcription failed: {}", e);
                    output.push_str(&format!("\n\nAudio transcript unavailable: {}", e));
                }
            }
        }

        Ok(output)
    }

    /// Put the video on disk inside `work_dir`, downloading if needed.
    async fn fetch_video(&self, source: &str, work_dir: &Path) -> Result<PathBuf> {
        if let Some(video_id) = media::youtube_id(source) {
            return media::download_youtube(&video_id, work_dir).await;
        }

        if is_url(source) {
            let loaded = self.loader.load(source).await?;
            let ext = loaded.extension().unwrap_or_else(|| "mp4".to_string());
            let path = work_dir.join(format!("video.{}", ext));
            tokio::fs::write(&path, &loaded.bytes).await?;
            return Ok(path);
        }

        let path = PathBuf::from(source);
        if !path.exists() {
            return Err(SvarError::InvalidInput(format!("File not found: {}", source)));
        }
        Ok(path)
    }
}
