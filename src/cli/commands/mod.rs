//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod questions;
mod run;
mod submit;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use questions::run_questions;
pub use run::{read_report, run_all, write_report, RunOptions};
pub use submit::run_submit;

use crate::config::Settings;
use crate::scoring::ScoringClient;
use std::time::Duration;

/// Scoring client configured from settings.
fn scoring_client(settings: &Settings) -> ScoringClient {
    ScoringClient::new(settings.api_url())
        .with_fetch_timeout(Duration::from_secs(settings.api.fetch_timeout_secs))
        .with_submit_timeout(Duration::from_secs(settings.api.submit_timeout_secs))
}
