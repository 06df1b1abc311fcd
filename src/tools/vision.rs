//! Shared vision-model request used by the image and video tools.

use crate::error::{Result, SvarError};
use crate::openai::OpenAIClient;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
    ImageUrlArgs,
};
use base64::Engine;
use tracing::debug;

/// Encode image bytes as a `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Guess an image MIME type from a Content-Type header or file extension.
pub fn image_mime(content_type: Option<&str>, extension: Option<&str>) -> Option<&'static str> {
    if let Some(ct) = content_type {
        match ct {
            "image/png" => return Some("image/png"),
            "image/jpeg" | "image/jpg" => return Some("image/jpeg"),
            "image/gif" => return Some("image/gif"),
            "image/webp" => return Some("image/webp"),
            _ => {}
        }
    }

    match extension? {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Ask a vision model about one or more images.
pub async fn describe_images(
    client: &OpenAIClient,
    model: &str,
    prompt: &str,
    image_urls: Vec<String>,
    detail: ImageDetail,
) -> Result<String> {
    let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(prompt)
            .build()
            .map_err(|e| SvarError::Tool(e.to_string()))?
            .into(),
    ];

    for url in image_urls {
        let image_url = ImageUrlArgs::default()
            .url(url)
            .detail(detail.clone())
            .build()
            .map_err(|e| SvarError::Tool(e.to_string()))?;
        parts.push(
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(image_url)
                .build()
                .map_err(|e| SvarError::Tool(e.to_string()))?
                .into(),
        );
    }

    debug!("Sending {} content parts to {}", parts.len(), model);

    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestUserMessageArgs::default()
            .content(parts)
            .build()
            .map_err(|e| SvarError::Tool(e.to_string()))?
            .into(),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(0.0)
        .build()
        .map_err(|e| SvarError::Tool(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| SvarError::OpenAI(format!("Vision request failed: {}", e)))?;

    response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SvarError::Tool("Empty response from vision model".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Some("image/png"), None), Some("image/png"));
        assert_eq!(image_mime(Some("application/octet-stream"), Some("jpg")), Some("image/jpeg"));
        assert_eq!(image_mime(None, Some("webp")), Some("image/webp"));
        assert_eq!(image_mime(None, Some("bmp")), None);
        assert_eq!(image_mime(None, None), None);
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }
}
