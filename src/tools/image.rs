//! Image description via a vision model.

use super::source::SourceLoader;
use super::vision::{data_uri, describe_images, image_mime};
use crate::config::Prompts;
use crate::error::{Result, SvarError};
use crate::openai::OpenAIClient;
use async_openai::types::ImageDetail;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Describes images for the agent.
pub struct ImageReader {
    client: OpenAIClient,
    loader: SourceLoader,
    model: String,
    prompts: Prompts,
}

impl ImageReader {
    pub fn new(client: OpenAIClient, loader: SourceLoader, model: &str, prompts: Prompts) -> Self {
        Self {
            client,
            loader,
            model: model.to_string(),
            prompts,
        }
    }

    /// Describe the image at `source`, focusing on `question` when given.
    #[instrument(skip(self))]
    pub async fn read(&self, source: &str, question: Option<&str>) -> Result<String> {
        let loaded = self.loader.load(source).await?;

        let mime = image_mime(loaded.content_type.as_deref(), loaded.extension().as_deref())
            .ok_or_else(|| {
                SvarError::Tool(format!(
                    "'{}' is not a supported image (png, jpeg, gif, webp)",
                    loaded.name
                ))
            })?;

        info!("Describing {} ({} bytes) with {}", loaded.name, loaded.bytes.len(), self.model);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.unwrap_or_default().to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.tools.image, &vars);

        describe_images(
            &self.client,
            &self.model,
            &prompt,
            vec![data_uri(mime, &loaded.bytes)],
            ImageDetail::High,
        )
        .await
    }
}
