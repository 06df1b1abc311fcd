//! Svar - answer benchmark questions with a tool-using agent
//!
//! A CLI tool that fetches quiz-style questions from a scoring service,
//! answers them with an LLM agent, and submits the answers for grading.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Fetch the question set from a scoring service
//! - Answer each question with an agent that can read images, audio, video
//!   and code files and search Wikipedia or the web
//! - Keep going when a single question fails, and report which ones did
//! - Submit the collected answers for scoring
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `scoring` - Scoring service client (questions, files, submission)
//! - `augment` - Adds file URL and extension lines to questions
//! - `tools` - Tool implementations (vision, transcription, search, ...)
//! - `media` - yt-dlp and ffmpeg helpers for video
//! - `agent` - Tool-calling agent loop and capability registry
//! - `orchestrator` - The fetch-answer-submit run
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svar::agent::Agent;
//! use svar::config::Settings;
//! use svar::orchestrator::Orchestrator;
//! use svar::scoring::ScoringClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let agent = Arc::new(Agent::from_settings(&settings)?);
//!     let orchestrator = Orchestrator::new(ScoringClient::new(settings.api_url()), agent);
//!
//!     let report = orchestrator.run().await?;
//!     println!("Answered {} of {} questions", report.answers.len(), report.results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod augment;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod openai;
pub mod orchestrator;
pub mod scoring;
pub mod tools;

pub use error::{Result, SvarError};
