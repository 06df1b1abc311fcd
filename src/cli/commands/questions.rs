//! Questions command implementation.

use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

use super::scoring_client;

/// List the questions served by the scoring service.
pub async fn run_questions(settings: Settings) -> Result<()> {
    let client = scoring_client(&settings);

    let spinner = Output::spinner("Fetching questions...");
    let fetched = client.fetch_questions().await;
    spinner.finish_and_clear();

    let records = match fetched {
        Ok(records) => records,
        Err(e) => {
            Output::error(&format!("Error fetching questions: {}", e));
            return Err(e.into());
        }
    };

    Output::header(&format!("Questions ({})", records.len()));

    let mut with_files = 0;
    for record in &records {
        let Some(task) = record.usable() else {
            Output::warning(&format!("Incomplete record: {:?}", record));
            continue;
        };
        if task.file_name.is_some() {
            with_files += 1;
        }
        Output::question(&task.task_id, &task.question, task.file_name.as_deref());
    }

    println!();
    Output::kv("Total", &records.len().to_string());
    Output::kv("With attachments", &with_files.to_string());

    Ok(())
}
