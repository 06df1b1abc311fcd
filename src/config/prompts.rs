//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    /// Prompts used by the vision-backed tools.
    pub tools: ToolPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the answering agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a general AI assistant solving benchmark questions. Think step by step about what information you need, then use the available tools to gather it.

Tools:
- 'read_image' describes an image from a URL or path
- 'transcribe_audio' turns an audio file into text
- 'run_video' describes sampled frames of a video (YouTube links work) and transcribes its audio
- 'read_code' returns the raw text of a code, text or tabular file, including spreadsheets
- 'search_wikipedia' returns encyclopedia article extracts
- 'web_search' returns web search results

If a file_url is available or a URL is given in the question statement, request and use that content to answer the question.
If a code file, such as a .py file, is given, do not attempt to execute it; open it as text with 'read_code' and analyze the content.
When a tabular file such as csv, tsv or xlsx is given, read it with 'read_code' (spreadsheets come back as comma-separated rows per sheet) and work through the rows carefully.

Make sure you provide the answer in accordance with the instructions in the question. Do not return the raw output of a tool as your final answer.
Do not add any additional information, explanation, unnecessary words or symbols. The answer is likely as simple as one word."#
                .to_string(),
        }
    }
}

/// Prompts for the vision-backed tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPrompts {
    pub image: String,
    pub video: String,
}

impl Default for ToolPrompts {
    fn default() -> Self {
        Self {
            image: r#"Describe this image in detail. Transcribe any visible text exactly, list every object, person, number and position you can see, and note anything unusual.
{{#if question}}
Pay particular attention to details relevant to this question: {{question}}
{{/if}}"#
                .to_string(),
            video: r#"These are {{frame_count}} frames sampled evenly from a video, in order. Describe what happens across them, transcribe any on-screen text, and count relevant objects or animals per frame when visible.
{{#if question}}
Pay particular attention to details relevant to this question: {{question}}
{{/if}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let tools_path = custom_path.join("tools.toml");
            if tools_path.exists() {
                let content = std::fs::read_to_string(&tools_path)?;
                prompts.tools = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Supports `{{name}}` substitution and `{{#if name}}...{{/if}}` blocks,
    /// which are kept only when the variable is present and non-empty.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();

        while let Some(start) = result.find("{{#if ") {
            let Some(name_end) = result[start..].find("}}").map(|i| start + i) else {
                break;
            };
            let name = result[start + 6..name_end].trim().to_string();
            let Some(close) = result[name_end..].find("{{/if}}").map(|i| name_end + i) else {
                break;
            };

            let body = result[name_end + 2..close].to_string();
            let keep = vars.get(&name).is_some_and(|v| !v.is_empty());
            let replacement = if keep { body } else { String::new() };
            result.replace_range(start..close + "{{/if}}".len(), &replacement);
        }

        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result.trim().to_string()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.agent.system.contains("file_url"));
        assert!(!prompts.tools.image.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_conditional_block() {
        let template = "Describe.\n{{#if question}}\nFocus: {{question}}\n{{/if}}";

        let empty = Prompts::render(template, &HashMap::new());
        assert_eq!(empty, "Describe.");

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "How many birds?".to_string());
        let filled = Prompts::render(template, &vars);
        assert!(filled.ends_with("Focus: How many birds?"));
    }

    #[test]
    fn test_custom_agent_prompt_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("agent.toml"),
            "system = \"Answer for {{team}}.\"\n",
        )
        .unwrap();

        let mut vars = HashMap::new();
        vars.insert("team".to_string(), "blue".to_string());
        let prompts = Prompts::load(dir.path().to_str(), Some(&vars)).unwrap();

        assert_eq!(
            prompts.render_with_custom(&prompts.agent.system, &HashMap::new()),
            "Answer for blue."
        );
    }
}
