//! HTTP client for the scoring service.

use super::models::{AnswerRecord, Submission, SubmissionResult, TaskRecord};
use crate::error::{Result, SvarError};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Maximum number of body characters quoted in error messages.
const ERROR_BODY_PREVIEW: usize = 500;

/// Client for the question, file and submission endpoints.
pub struct ScoringClient {
    http: reqwest::Client,
    base_url: String,
    fetch_timeout: Duration,
    submit_timeout: Duration,
}

impl ScoringClient {
    /// Create a client for the given base URL with default timeouts.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            fetch_timeout: Duration::from_secs(15),
            submit_timeout: Duration::from_secs(60),
        }
    }

    /// Set the timeout for the question fetch.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the timeout for answer submission.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all questions in a single request.
    ///
    /// Fails on network errors, non-2xx statuses, bodies that are not a JSON
    /// array of task records, and empty arrays.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_questions(&self) -> Result<Vec<TaskRecord>> {
        let url = format!("{}/questions", self.base_url);
        info!("Fetching questions from: {}", url);

        let response = self
            .http
            .get(&url)
            .timeout(self.fetch_timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SvarError::Api(format!(
                "GET {} returned {}: {}",
                url,
                status,
                preview(&body)
            )));
        }

        let questions: Vec<TaskRecord> =
            serde_json::from_str(&body).map_err(|e| SvarError::MalformedResponse {
                endpoint: url.clone(),
                message: e.to_string(),
                body: preview(&body),
            })?;

        if questions.is_empty() {
            return Err(SvarError::EmptyQuestionList);
        }

        info!("Fetched {} questions.", questions.len());
        Ok(questions)
    }

    /// Submit answers for scoring.
    #[instrument(skip(self, answers), fields(count = answers.len()))]
    pub async fn submit_answers(
        &self,
        username: &str,
        agent_code: &str,
        answers: &[AnswerRecord],
    ) -> Result<SubmissionResult> {
        if answers.is_empty() {
            return Err(SvarError::InvalidInput(
                "Agent did not produce any answers to submit.".to_string(),
            ));
        }
        if username.trim().is_empty() {
            return Err(SvarError::InvalidInput("Username must not be empty".to_string()));
        }

        let url = format!("{}/submit", self.base_url);
        info!("Submitting {} answers for user '{}' to: {}", answers.len(), username, url);

        let submission = Submission {
            username: username.trim(),
            agent_code,
            answers,
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.submit_timeout)
            .json(&submission)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Submission response status: {}", status);

        if !status.is_success() {
            return Err(SvarError::Api(format!(
                "Submission failed with status {}: {}",
                status,
                error_detail(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| SvarError::MalformedResponse {
            endpoint: url,
            message: e.to_string(),
            body: preview(&body),
        })
    }
}

/// First characters of a response body, for error messages.
fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

/// Extract a `detail` field from an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
        .unwrap_or_else(|| preview(body))
}
