//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, ToolRegistry};
use super::Answerer;
use crate::config::{Prompts, Settings};
use crate::error::{Result, SvarError};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionToolChoiceOption, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Nudge sent when the step budget is exhausted.
const FINAL_STEP_PROMPT: &str = "You have reached the maximum number of steps. \
Using what you have gathered so far, reply now with only the final answer.";

/// Agent that answers questions using the tools in its registry.
pub struct Agent {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    tools: ToolRegistry,
    max_steps: usize,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent with the given tool registry and model.
    pub fn new(client: OpenAIClient, tools: ToolRegistry, model: &str, system_prompt: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: 0.1,
            tools,
            max_steps: 20,
            system_prompt: system_prompt.to_string(),
        }
    }

    /// Build an agent, its client and its tool registry from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let client = create_client()?;
        let tools = ToolRegistry::from_settings(client.clone(), settings, prompts.clone())?;
        let system_prompt = prompts.render_with_custom(&prompts.agent.system, &HashMap::new());

        info!(
            "Agent using {} with tools: {}",
            settings.agent.model,
            tools
                .capabilities()
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self::new(client, tools, &settings.agent.model, &system_prompt)
            .with_temperature(settings.agent.temperature)
            .with_max_steps(settings.agent.max_steps))
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set maximum model calls per question.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the agent on a single question.
    pub async fn run(&self, task: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| SvarError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(task.to_string())
                .build()
                .map_err(|e| SvarError::Agent(e.to_string()))?
                .into(),
        ];

        let mut tool_calls_made = Vec::new();
        let mut steps = 0;

        loop {
            steps += 1;
            let final_step = steps >= self.max_steps;
            debug!("Agent step {}/{}", steps, self.max_steps);

            if final_step && !tool_calls_made.is_empty() {
                messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(FINAL_STEP_PROMPT)
                        .build()
                        .map_err(|e| SvarError::Agent(e.to_string()))?
                        .into(),
                );
            }

            let mut request = CreateChatCompletionRequestArgs::default();
            request
                .model(&self.model)
                .messages(messages.clone())
                .temperature(self.temperature);

            let definitions = self.tools.definitions();
            if !definitions.is_empty() {
                request.tools(definitions);
                if final_step {
                    request.tool_choice(ChatCompletionToolChoiceOption::None);
                }
            }

            let request = request
                .build()
                .map_err(|e| SvarError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| SvarError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| SvarError::Agent("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() && !final_step => calls,
                _ => {
                    return build_response(&choice.message.content, tool_calls_made, steps);
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| SvarError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| SvarError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => {
                    warn!("Tool {} failed: {}", name, e);
                    format!("Tool error: {}", e)
                }
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

#[async_trait]
impl Answerer for Agent {
    async fn answer(&self, question: &str) -> Result<String> {
        let response = self.run(question).await?;
        info!(
            "Answered in {} step(s) with {} tool call(s)",
            response.steps,
            response.tool_calls.len()
        );

        let answer = clean_answer(&response.content);
        if answer.is_empty() {
            return Err(SvarError::Agent("Model returned an empty answer".to_string()));
        }
        Ok(answer)
    }
}

/// Build the final agent response.
fn build_response(
    content: &Option<String>,
    tool_calls: Vec<ToolCallRecord>,
    steps: usize,
) -> Result<AgentResponse> {
    Ok(AgentResponse {
        content: content.clone().unwrap_or_default(),
        tool_calls,
        steps,
    })
}

/// Trim whitespace and a leading "Final answer:" label from model output.
pub fn clean_answer(content: &str) -> String {
    let trimmed = content.trim();

    for prefix in ["final answer:", "answer:"] {
        let labelled = trimmed
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if labelled {
            return trimmed[prefix.len()..].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model calls used.
    pub steps: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
