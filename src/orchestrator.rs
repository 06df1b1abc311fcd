//! Question-answering run orchestration.
//!
//! Fetches every question once, answers them one at a time, and collects a
//! report plus the payload for submission. A failing question never stops
//! the run.

use crate::agent::Answerer;
use crate::augment::augment_question;
use crate::error::{Result, SvarError};
use crate::scoring::{AnswerRecord, ScoringClient, SubmissionResult, Task, TaskRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Prefix recorded in the report when the agent fails on a task.
pub const AGENT_ERROR_PREFIX: &str = "AGENT ERROR";

/// Result of answering a single task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Answered(String),
    Failed(String),
}

impl TaskOutcome {
    /// Text shown in the report for this outcome.
    pub fn report_text(&self) -> String {
        match self {
            TaskOutcome::Answered(answer) => answer.clone(),
            TaskOutcome::Failed(reason) => format!("{}: {}", AGENT_ERROR_PREFIX, reason),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, TaskOutcome::Answered(_))
    }
}

/// One row of the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    #[serde(rename = "Task ID")]
    pub task_id: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Submitted Answer")]
    pub submitted_answer: String,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every usable task was answered.
    Complete,
    /// Some tasks failed, at least one was answered.
    Partial,
    /// The agent did not produce any answers.
    NoAnswers,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Partial => write!(f, "partial"),
            RunStatus::NoAnswers => write!(f, "no answers"),
        }
    }
}

/// Accumulated results of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    /// Per-task rows, including failures.
    pub results: Vec<ResultEntry>,
    /// Submission payload, successful answers only.
    pub answers: Vec<AnswerRecord>,
    /// Records dropped for a missing task id or question.
    #[serde(default)]
    pub skipped: usize,
    /// Tasks where the agent failed.
    #[serde(default)]
    pub failed: usize,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            results: Vec::new(),
            answers: Vec::new(),
            skipped: 0,
            failed: 0,
        }
    }
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if self.answers.is_empty() {
            RunStatus::NoAnswers
        } else if self.failed > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Complete
        }
    }

    /// Record the outcome of one task.
    fn record(&mut self, task: &Task, question: String, outcome: &TaskOutcome) {
        self.results.push(ResultEntry {
            task_id: task.task_id.clone(),
            question,
            submitted_answer: outcome.report_text(),
        });

        match outcome {
            TaskOutcome::Answered(answer) => self.answers.push(AnswerRecord {
                task_id: task.task_id.clone(),
                submitted_answer: answer.clone(),
            }),
            TaskOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Drives a full fetch-answer-submit pass.
pub struct Orchestrator {
    scoring: ScoringClient,
    answerer: Arc<dyn Answerer>,
}

impl Orchestrator {
    pub fn new(scoring: ScoringClient, answerer: Arc<dyn Answerer>) -> Self {
        Self { scoring, answerer }
    }

    pub fn scoring(&self) -> &ScoringClient {
        &self.scoring
    }

    /// Fetch questions and answer all of them.
    pub async fn run(&self) -> Result<RunReport> {
        let records = self.scoring.fetch_questions().await?;
        Ok(self.answer_all(&records, |_| {}).await)
    }

    /// Answer every usable record in order.
    ///
    /// `on_result` is called after each task with its report row.
    #[instrument(skip_all, fields(count = records.len()))]
    pub async fn answer_all<F>(&self, records: &[TaskRecord], mut on_result: F) -> RunReport
    where
        F: FnMut(&ResultEntry),
    {
        let mut report = RunReport::default();
        info!("Running agent on {} questions...", records.len());

        for record in records {
            let Some(task) = record.usable() else {
                warn!("Skipping item with missing task_id or question: {:?}", record);
                report.skipped += 1;
                continue;
            };

            let question = augment_question(
                &task.task_id,
                &task.question,
                task.file_name.as_deref(),
                self.scoring.base_url(),
            );

            let outcome = self.invoke(&task, &question).await;
            report.record(&task, question, &outcome);

            if let Some(entry) = report.results.last() {
                on_result(entry);
            }
        }

        report.generated_at = Utc::now();

        if report.answers.is_empty() {
            warn!("Agent did not produce any answers to submit.");
        }
        report
    }

    /// Call the agent, converting any failure into a [`TaskOutcome::Failed`].
    pub async fn invoke(&self, task: &Task, question: &str) -> TaskOutcome {
        match self.answerer.answer(question).await {
            Ok(answer) => {
                info!("Task {} answered: {}", task.task_id, answer);
                TaskOutcome::Answered(answer)
            }
            Err(e) => {
                error!("Error running agent on task {}: {}", task.task_id, e);
                TaskOutcome::Failed(e.to_string())
            }
        }
    }

    /// Submit a report's answers for scoring.
    pub async fn submit(
        &self,
        report: &RunReport,
        username: &str,
        agent_code: &str,
    ) -> Result<SubmissionResult> {
        if report.status() == RunStatus::NoAnswers {
            return Err(SvarError::InvalidInput(
                "Agent did not produce any answers to submit.".to_string(),
            ));
        }
        self.scoring
            .submit_answers(username, agent_code, &report.answers)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers from a script and remembers every question it saw.
    struct ScriptedAnswerer {
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl ScriptedAnswerer {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl Answerer for ScriptedAnswerer {
        async fn answer(&self, question: &str) -> Result<String> {
            self.seen.lock().unwrap().push(question.to_string());
            if self.fail_on.is_some_and(|marker| question.contains(marker)) {
                return Err(SvarError::Agent("model exploded".to_string()));
            }
            Ok(format!("answer #{}", self.seen.lock().unwrap().len()))
        }
    }

    fn record(task_id: Option<&str>, question: Option<&str>, file_name: Option<&str>) -> TaskRecord {
        TaskRecord {
            task_id: task_id.map(str::to_string),
            question: question.map(str::to_string),
            file_name: file_name.map(str::to_string),
        }
    }

    fn orchestrator(base_url: &str, answerer: Arc<ScriptedAnswerer>) -> Orchestrator {
        Orchestrator::new(ScoringClient::new(base_url), answerer)
    }

    #[tokio::test]
    async fn test_end_to_end_two_tasks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/questions")
            .with_status(200)
            .with_body(
                r#"[{"task_id": "1", "question": "What is 2+2?"},
                    {"task_id": "2", "question": "Read file", "file_name": "data.csv"}]"#,
            )
            .create_async()
            .await;

        let answerer = Arc::new(ScriptedAnswerer::new(None));
        let report = orchestrator(&server.url(), answerer.clone()).run().await.unwrap();

        let ids: Vec<&str> = report.answers.iter().map(|a| a.task_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(report.status(), RunStatus::Complete);

        let seen = answerer.seen.lock().unwrap();
        assert!(seen[0].contains("file_url : No URL provided"));
        assert!(seen[1].contains("file_extension : csv"));
        assert!(seen[1].contains(&format!("file_url : {}/files/2", server.url())));
    }

    #[tokio::test]
    async fn test_empty_question_list_never_invokes_agent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/questions")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let answerer = Arc::new(ScriptedAnswerer::new(None));
        let err = orchestrator(&server.url(), answerer.clone()).run().await.unwrap_err();

        assert!(matches!(err, SvarError::EmptyQuestionList));
        assert!(answerer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/questions")
            .with_status(500)
            .create_async()
            .await;

        let answerer = Arc::new(ScriptedAnswerer::new(None));
        assert!(orchestrator(&server.url(), answerer.clone()).run().await.is_err());
        assert!(answerer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_agent_failure_does_not_abort_run() {
        let answerer = Arc::new(ScriptedAnswerer::new(Some("explode")));
        let orch = orchestrator("https://scoring.example", answerer.clone());

        let records = vec![
            record(Some("a"), Some("first"), None),
            record(Some("b"), Some("please explode"), None),
            record(Some("c"), Some("third"), None),
        ];

        let mut streamed = Vec::new();
        let report = orch
            .answer_all(&records, |entry| streamed.push(entry.task_id.clone()))
            .await;

        assert_eq!(streamed, vec!["a", "b", "c"]);
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.answers.len(), 2);
        assert_eq!(report.failed, 1);
        assert!(report.results[1].submitted_answer.starts_with("AGENT ERROR"));
        assert!(report.results[1].submitted_answer.contains("model exploded"));
        assert_eq!(report.status(), RunStatus::Partial);
    }

    #[tokio::test]
    async fn test_incomplete_records_are_skipped() {
        let answerer = Arc::new(ScriptedAnswerer::new(None));
        let orch = orchestrator("https://scoring.example", answerer.clone());

        let records = vec![
            record(None, Some("no id"), None),
            record(Some("ok"), Some("fine"), Some("pic.png")),
            record(Some("no-question"), None, Some("x.mp3")),
            record(Some(""), Some("empty id"), None),
        ];
        let report = orch.answer_all(&records, |_| {}).await;

        assert_eq!(report.skipped, 3);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.answers.len(), 1);
        assert_eq!(report.answers[0].task_id, "ok");
        assert_eq!(answerer.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_reports_no_answers() {
        let answerer = Arc::new(ScriptedAnswerer::new(Some("?")));
        let orch = orchestrator("https://scoring.example", answerer);

        let records = vec![record(Some("1"), Some("why?"), None)];
        let report = orch.answer_all(&records, |_| {}).await;

        assert_eq!(report.status(), RunStatus::NoAnswers);
        assert_eq!(report.results.len(), 1);

        let err = orch.submit(&report, "me", "code").await.unwrap_err();
        assert!(matches!(err, SvarError::InvalidInput(_)));
    }

    #[test]
    fn test_report_json_keys() {
        let entry = ResultEntry {
            task_id: "1".to_string(),
            question: "Q".to_string(),
            submitted_answer: "A".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["Task ID"], "1");
        assert_eq!(value["Submitted Answer"], "A");
    }
}
