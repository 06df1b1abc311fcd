//! Scoring service integration.
//!
//! The service exposes the benchmark questions, the files attached to them,
//! and an endpoint that grades submitted answers.

mod client;
mod models;

pub use client::ScoringClient;
pub use models::{AnswerRecord, Submission, SubmissionResult, Task, TaskRecord};
