//! Agent system for answering questions with tool calling.
//!
//! Provides an LLM agent that can read images, audio, video and code files
//! and search Wikipedia or the web before settling on an answer.

mod runner;
mod tools;

pub use runner::{clean_answer, Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, Capability, ToolCall, ToolRegistry};

use crate::error::Result;
use async_trait::async_trait;

/// Anything that can turn a question into an answer.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// Answer a single (already augmented) question.
    async fn answer(&self, question: &str) -> Result<String>;
}
