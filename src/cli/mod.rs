//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - answer benchmark questions with a tool-using agent
///
/// Fetches questions from the scoring service, answers each one with an LLM
/// agent that can read files, watch videos and search the web, and optionally
/// submits the answers. "Svar" is Norwegian for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Scoring service base URL (overrides config)
    #[arg(long, global = true, env = "SVAR_API_URL")]
    pub api_url: Option<String>,

    /// LLM model driving the agent (overrides config)
    #[arg(short, long, global = true, env = "SVAR_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all questions, answer them, and optionally submit
    Run {
        /// Only answer the first N questions
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<String>,

        /// Submit the answers when the run finishes
        #[arg(long, requires_all = ["username", "agent_code"])]
        submit: bool,

        /// Username for submission
        #[arg(long)]
        username: Option<String>,

        /// Link to the agent's code, sent with the submission
        #[arg(long)]
        agent_code: Option<String>,
    },

    /// List the questions served by the scoring service
    Questions,

    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,

        /// Attached file name (adds file_url and file_extension lines)
        #[arg(short, long)]
        file_name: Option<String>,

        /// Task ID used to build the file URL
        #[arg(short, long, default_value = "local")]
        task_id: String,
    },

    /// Submit answers from a saved report
    Submit {
        /// Report file written by `svar run --output`
        report: String,

        /// Username for submission
        #[arg(long)]
        username: String,

        /// Link to the agent's code, sent with the submission
        #[arg(long)]
        agent_code: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
