//! Run command: answer every question from the scoring service.

use crate::agent::{Agent, Answerer};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, RunReport, RunStatus, AGENT_ERROR_PREFIX};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use super::scoring_client;

/// Options for the run command.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub limit: Option<usize>,
    pub output: Option<String>,
    pub submit: bool,
    pub username: Option<String>,
    pub agent_code: Option<String>,
}

/// Run the full fetch-answer-submit pass.
pub async fn run_all(options: RunOptions, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let agent: Arc<dyn Answerer> = match Agent::from_settings(&settings) {
        Ok(agent) => Arc::new(agent),
        Err(e) => {
            Output::error(&format!("Error initializing agent: {}", e));
            return Err(e.into());
        }
    };

    let orchestrator = Orchestrator::new(scoring_client(&settings), agent);

    let spinner = Output::spinner("Fetching questions...");
    let fetched = orchestrator.scoring().fetch_questions().await;
    spinner.finish_and_clear();

    let mut records = match fetched {
        Ok(records) => records,
        Err(e) => {
            Output::error(&format!("Error fetching questions: {}", e));
            return Err(e.into());
        }
    };
    Output::info(&format!("Fetched {} questions.", records.len()));

    if let Some(limit) = options.limit {
        records.truncate(limit);
    }

    let progress = Output::progress_bar(records.len() as u64, "Answering");
    let report = orchestrator
        .answer_all(&records, |entry| {
            progress.set_message(entry.task_id.clone());
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    print_report(&report);

    if let Some(path) = &options.output {
        write_report(&report, Path::new(path))?;
        Output::success(&format!("Report written to {}", path));
    }

    if report.status() == RunStatus::NoAnswers {
        Output::warning("Agent did not produce any answers to submit.");
        return Ok(());
    }

    if options.submit {
        let username = options.username.as_deref().unwrap_or_default();
        let agent_code = options.agent_code.as_deref().unwrap_or_default();

        let spinner = Output::spinner("Submitting answers...");
        let result = orchestrator.submit(&report, username, agent_code).await;
        spinner.finish_and_clear();

        match result {
            Ok(result) => {
                Output::header("Submission Successful!");
                println!("{}", result);
            }
            Err(e) => {
                Output::error(&format!("Submission Failed: {}", e));
                return Err(e.into());
            }
        }
    }

    Ok(())
}

/// Print the per-task table and summary.
fn print_report(report: &RunReport) {
    Output::header(&format!("Results ({})", report.results.len()));
    println!();

    for entry in &report.results {
        let failed = entry.submitted_answer.starts_with(AGENT_ERROR_PREFIX);
        Output::result_row(&entry.task_id, &entry.submitted_answer, failed);
    }

    println!();
    Output::kv("Status", &report.status().to_string());
    Output::kv("Answered", &report.answers.len().to_string());
    Output::kv("Failed", &report.failed.to_string());
    if report.skipped > 0 {
        Output::kv("Skipped", &report.skipped.to_string());
    }
}

/// On-disk report layout: the report plus its computed status.
#[derive(Serialize)]
struct ReportFile<'a> {
    status: RunStatus,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Write a report as pretty JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = ReportFile {
        status: report.status(),
        report,
    };
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a report written by [`write_report`].
pub fn read_report(path: &Path) -> Result<RunReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let report = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid report", path.display()))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ResultEntry;
    use crate::scoring::AnswerRecord;

    #[test]
    fn test_report_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");

        let report = RunReport {
            results: vec![ResultEntry {
                task_id: "1".to_string(),
                question: "What is 2+2?".to_string(),
                submitted_answer: "4".to_string(),
            }],
            answers: vec![AnswerRecord {
                task_id: "1".to_string(),
                submitted_answer: "4".to_string(),
            }],
            ..Default::default()
        };

        write_report(&report, &path).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["status"], "complete");

        let loaded = read_report(&path).unwrap();

        assert_eq!(loaded.answers, report.answers);
        assert_eq!(loaded.status(), RunStatus::Complete);
    }

    #[test]
    fn test_read_report_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_report(&path).is_err());
    }
}
