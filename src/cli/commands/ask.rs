//! Ask command implementation.

use crate::agent::{clean_answer, Agent};
use crate::augment::augment_question;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Answer a single question with the agent.
pub async fn run_ask(
    question: &str,
    file_name: Option<String>,
    task_id: &str,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let agent = Agent::from_settings(&settings)?;

    let prompt = match file_name.as_deref() {
        Some(name) => augment_question(task_id, question, Some(name), settings.api_url()),
        None => question.to_string(),
    };

    let spinner = Output::spinner("Agent working...");

    match agent.run(&prompt).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", clean_answer(&response.content));

            if !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    Output::info(&format!("  {} {}", call.name, truncate(&call.arguments, 60)));
                }
                println!();
            }

            Output::info(&format!(
                "Completed in {} step(s) with {}",
                response.steps,
                agent.model()
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 60), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
