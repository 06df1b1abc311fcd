//! Submit command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::RunStatus;
use anyhow::{bail, Result};
use std::path::Path;

use super::{read_report, scoring_client};

/// Submit the answers stored in a report file.
pub async fn run_submit(
    report_path: &str,
    username: &str,
    agent_code: &str,
    settings: Settings,
) -> Result<()> {
    let report = read_report(Path::new(report_path))?;
    if report.status() == RunStatus::NoAnswers {
        Output::warning("Report contains no answers to submit.");
        bail!("Agent did not produce any answers to submit.");
    }

    Output::info(&format!(
        "Submitting {} answers from {}",
        report.answers.len(),
        report_path
    ));

    let client = scoring_client(&settings);
    let spinner = Output::spinner("Submitting answers...");
    let result = client
        .submit_answers(username, agent_code, &report.answers)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            Output::header("Submission Successful!");
            println!("{}", result);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Submission Failed: {}", e));
            Err(e.into())
        }
    }
}
