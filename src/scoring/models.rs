//! Wire types exchanged with the scoring service.

use serde::{Deserialize, Serialize};

/// A question as delivered by `GET /questions`.
///
/// Every field is optional on the wire; use [`TaskRecord::usable`] to get a
/// record the answering loop can work with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// A validated task with an id and question text.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: String,
    pub question: String,
    pub file_name: Option<String>,
}

impl TaskRecord {
    /// Validate the record. Returns `None` when the id is missing or empty,
    /// or the question is missing.
    pub fn usable(&self) -> Option<Task> {
        let task_id = self.task_id.as_deref().filter(|id| !id.is_empty())?;
        let question = self.question.as_ref()?;

        Some(Task {
            task_id: task_id.to_string(),
            question: question.clone(),
            file_name: self.file_name.clone().filter(|f| !f.is_empty()),
        })
    }
}

/// One answer in the submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub task_id: String,
    pub submitted_answer: String,
}

/// Body of `POST /submit`.
#[derive(Debug, Clone, Serialize)]
pub struct Submission<'a> {
    pub username: &'a str,
    pub agent_code: &'a str,
    pub answers: &'a [AnswerRecord],
}

/// Scoring service response to a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub correct_count: Option<u32>,
    #[serde(default)]
    pub total_attempted: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User: {}\nOverall Score: {}% ({}/{} correct)\nMessage: {}",
            self.username.as_deref().unwrap_or("unknown"),
            self.score.map(|s| format!("{:.1}", s)).unwrap_or_else(|| "N/A".to_string()),
            self.correct_count.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
            self.total_attempted.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string()),
            self.message.as_deref().unwrap_or("No message received."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_requires_id_and_question() {
        let full = TaskRecord {
            task_id: Some("1".to_string()),
            question: Some("What is 2+2?".to_string()),
            file_name: Some(String::new()),
        };
        let task = full.usable().unwrap();
        assert_eq!(task.task_id, "1");
        assert_eq!(task.file_name, None);

        let no_id = TaskRecord {
            question: Some("Q".to_string()),
            ..Default::default()
        };
        assert!(no_id.usable().is_none());

        let empty_id = TaskRecord {
            task_id: Some(String::new()),
            question: Some("Q".to_string()),
            ..Default::default()
        };
        assert!(empty_id.usable().is_none());

        let no_question = TaskRecord {
            task_id: Some("2".to_string()),
            ..Default::default()
        };
        assert!(no_question.usable().is_none());
    }

    #[test]
    fn test_task_record_ignores_extra_fields() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"task_id": "abc", "question": "Q?", "Level": "1", "file_name": "x.mp3"}"#,
        )
        .unwrap();
        assert_eq!(record.file_name.as_deref(), Some("x.mp3"));
    }

    #[test]
    fn test_submission_payload_shape() {
        let answers = vec![AnswerRecord {
            task_id: "1".to_string(),
            submitted_answer: "4".to_string(),
        }];
        let submission = Submission {
            username: "me",
            agent_code: "https://example.com/code",
            answers: &answers,
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["answers"][0]["task_id"], "1");
        assert_eq!(value["answers"][0]["submitted_answer"], "4");
        assert_eq!(value["username"], "me");
    }
}
