//! Tool definitions and dispatch for the agent system.

use crate::config::{Prompts, Settings};
use crate::error::{Result, SvarError};
use crate::openai::OpenAIClient;
use crate::tools::{
    self, AudioTranscriber, CodeReader, ImageReader, SourceLoader, VideoSampler, WebSearch,
    WikipediaSearch,
};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Capabilities that can be handed to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ReadImage,
    TranscribeAudio,
    RunVideo,
    SearchWikipedia,
    ReadCode,
    WebSearch,
}

impl Capability {
    /// Every capability, in the order they are advertised.
    pub const ALL: [Capability; 6] = [
        Capability::ReadImage,
        Capability::TranscribeAudio,
        Capability::ReadCode,
        Capability::RunVideo,
        Capability::SearchWikipedia,
        Capability::WebSearch,
    ];

    /// Function name exposed to the model.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::ReadImage => "read_image",
            Capability::TranscribeAudio => "transcribe_audio",
            Capability::RunVideo => "run_video",
            Capability::SearchWikipedia => "search_wikipedia",
            Capability::ReadCode => "read_code",
            Capability::WebSearch => "web_search",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Capability::ReadImage => {
                "Describe an image (png, jpg, gif, webp) from a URL or file path. \
                Use this for file_url attachments that are images, e.g. chess positions or charts."
            }
            Capability::TranscribeAudio => {
                "Transcribe speech in an audio file (mp3, wav, m4a, ...) from a URL or file path."
            }
            Capability::RunVideo => {
                "Watch a video (YouTube link, video URL or file path): returns descriptions of \
                evenly sampled frames and a transcript of the audio track."
            }
            Capability::SearchWikipedia => {
                "Search Wikipedia and return the plain text of the top matching articles. \
                Prefer this for encyclopedic facts, discographies, dates and lists."
            }
            Capability::ReadCode => {
                "Return the raw text content of a code, text or tabular (csv, tsv, json, xlsx, xls) file \
                from a URL or file path. Never executes the file."
            }
            Capability::WebSearch => {
                "Search the web and return the top result titles, URLs and snippets."
            }
        }
    }

    fn parameters(&self) -> serde_json::Value {
        match self {
            Capability::ReadImage | Capability::RunVideo => serde_json::json!({
                "type": "object",
                "properties": {
                    "source": {
                        "type": "string",
                        "description": "URL or local path of the file"
                    },
                    "question": {
                        "type": "string",
                        "description": "Optional question to focus the description on"
                    }
                },
                "required": ["source"]
            }),
            Capability::TranscribeAudio | Capability::ReadCode => serde_json::json!({
                "type": "object",
                "properties": {
                    "source": {
                        "type": "string",
                        "description": "URL or local path of the file"
                    }
                },
                "required": ["source"]
            }),
            Capability::SearchWikipedia | Capability::WebSearch => serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// OpenAI function definition for this capability.
    pub fn definition(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.name().to_string(),
                description: Some(self.description().to_string()),
                parameters: Some(self.parameters()),
                strict: None,
            },
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A parsed tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    ReadImage {
        source: String,
        #[serde(default)]
        question: Option<String>,
    },
    TranscribeAudio {
        source: String,
    },
    RunVideo {
        source: String,
        #[serde(default)]
        question: Option<String>,
    },
    SearchWikipedia {
        query: String,
    },
    ReadCode {
        source: String,
    },
    WebSearch {
        query: String,
    },
}

impl ToolCall {
    /// Capability this call needs.
    pub fn capability(&self) -> Capability {
        match self {
            ToolCall::ReadImage { .. } => Capability::ReadImage,
            ToolCall::TranscribeAudio { .. } => Capability::TranscribeAudio,
            ToolCall::RunVideo { .. } => Capability::RunVideo,
            ToolCall::SearchWikipedia { .. } => Capability::SearchWikipedia,
            ToolCall::ReadCode { .. } => Capability::ReadCode,
            ToolCall::WebSearch { .. } => Capability::WebSearch,
        }
    }
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
    let mut args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| SvarError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let object = args
        .as_object_mut()
        .ok_or_else(|| SvarError::Agent("Tool arguments must be a JSON object".to_string()))?;
    object.insert("name".to_string(), serde_json::Value::String(name.to_string()));

    serde_json::from_value(args)
        .map_err(|e| SvarError::Agent(format!("Invalid call to '{}': {}", name, e)))
}

/// The capabilities handed to an agent, with their implementations.
pub struct ToolRegistry {
    capabilities: Vec<Capability>,
    image: ImageReader,
    audio: AudioTranscriber,
    video: VideoSampler,
    wikipedia: WikipediaSearch,
    code: CodeReader,
    web: WebSearch,
    video_transcript: bool,
}

impl ToolRegistry {
    /// Build every tool from settings, enabling the configured capabilities.
    pub fn from_settings(client: OpenAIClient, settings: &Settings, prompts: Prompts) -> Result<Self> {
        let tool_settings = &settings.tools;
        let http = tools::http_client(Duration::from_secs(tool_settings.http_timeout_secs))?;
        let loader = SourceLoader::new(http.clone());

        Ok(Self {
            capabilities: dedup(&settings.agent.capabilities),
            image: ImageReader::new(
                client.clone(),
                loader.clone(),
                &tool_settings.vision_model,
                prompts.clone(),
            ),
            audio: AudioTranscriber::new(
                client.clone(),
                loader.clone(),
                &tool_settings.transcription_model,
            ),
            video: VideoSampler::new(
                client,
                loader.clone(),
                &tool_settings.vision_model,
                tool_settings.video_frames,
                settings.temp_dir(),
                prompts,
            ),
            wikipedia: WikipediaSearch::new(
                http.clone(),
                &tool_settings.wikipedia_language,
                tool_settings.search_results.min(3),
                tool_settings.max_read_chars,
            ),
            code: CodeReader::new(loader, tool_settings.max_read_chars),
            web: WebSearch::new(http, tool_settings.search_results),
            video_transcript: tool_settings.video_transcript,
        })
    }

    /// Restrict the registry to the given capabilities.
    pub fn with_capabilities(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = dedup(capabilities);
        self
    }

    /// Enabled capabilities.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Function definitions for the enabled capabilities.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.capabilities.iter().map(Capability::definition).collect()
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, call: &ToolCall) -> Result<String> {
        let capability = call.capability();
        if !self.is_enabled(capability) {
            return Err(SvarError::Tool(format!("Tool '{}' is not available", capability)));
        }

        match call {
            ToolCall::ReadImage { source, question } => {
                self.image.read(source, question.as_deref()).await
            }
            ToolCall::TranscribeAudio { source } => self.audio.transcribe(source).await,
            ToolCall::RunVideo { source, question } => {
                let transcriber = self.video_transcript.then_some(&self.audio);
                self.video.run(source, question.as_deref(), transcriber).await
            }
            ToolCall::SearchWikipedia { query } => self.wikipedia.search(query).await,
            ToolCall::ReadCode { source } => self.code.read(source).await,
            ToolCall::WebSearch { query } => self.web.search(query).await,
        }
    }
}

fn dedup(capabilities: &[Capability]) -> Vec<Capability> {
    let mut out = Vec::with_capacity(capabilities.len());
    for c in capabilities {
        if !out.contains(c) {
            out.push(*c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(capabilities: &[Capability]) -> ToolRegistry {
        let client = crate::openai::create_client().unwrap();
        ToolRegistry::from_settings(client, &Settings::default(), Prompts::default())
            .unwrap()
            .with_capabilities(capabilities)
    }

    #[test]
    fn test_parse_read_image_tool() {
        let tool = parse_tool_call(
            "read_image",
            r#"{"source": "https://x/files/1", "question": "Best move?"}"#,
        )
        .unwrap();
        assert_eq!(
            tool,
            ToolCall::ReadImage {
                source: "https://x/files/1".to_string(),
                question: Some("Best move?".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_optional_argument_defaults() {
        let tool = parse_tool_call("run_video", r#"{"source": "https://youtu.be/abc"}"#).unwrap();
        match tool {
            ToolCall::RunVideo { question, .. } => assert!(question.is_none()),
            _ => panic!("Expected RunVideo tool"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing() {
        assert!(parse_tool_call("python_exec", r#"{"code": "1"}"#).is_err());
        assert!(parse_tool_call("web_search", r#"{}"#).is_err());
        assert!(parse_tool_call("web_search", "not json").is_err());
        assert!(parse_tool_call("web_search", "[1]").is_err());
    }

    #[test]
    fn test_capability_names_match_tool_call_tags() {
        for capability in Capability::ALL {
            let args = match capability {
                Capability::SearchWikipedia | Capability::WebSearch => r#"{"query": "q"}"#,
                _ => r#"{"source": "s"}"#,
            };
            let call = parse_tool_call(capability.name(), args).unwrap();
            assert_eq!(call.capability(), capability);
        }
    }

    #[test]
    fn test_definitions_follow_enabled_capabilities() {
        let registry = registry(&[Capability::WebSearch, Capability::ReadCode, Capability::WebSearch]);
        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, vec!["web_search", "read_code"]);
    }

    #[tokio::test]
    async fn test_disabled_capability_is_rejected() {
        let registry = registry(&[Capability::ReadCode]);
        let err = registry
            .execute(&ToolCall::WebSearch {
                query: "anything".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[tokio::test]
    async fn test_read_code_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let registry = registry(&[Capability::ReadCode]);
        let out = registry
            .execute(&ToolCall::ReadCode {
                source: path.to_string_lossy().to_string(),
            })
            .await
            .unwrap();
        assert_eq!(out, "a,b\n1,2\n");
    }
}
