//! Svar CLI entry point.

use anyhow::Result;
use clap::Parser;
use svar::cli::{commands, Cli, Commands};
use svar::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("svar={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let mut settings = Settings::load_from(Some(&config_path))?;

    if let Some(api_url) = &cli.api_url {
        settings.api.base_url = api_url.clone();
    }
    if let Some(model) = &cli.model {
        settings.agent.model = model.clone();
    }

    std::fs::create_dir_all(settings.temp_dir())?;

    match &cli.command {
        Commands::Run {
            limit,
            output,
            submit,
            username,
            agent_code,
        } => {
            let options = commands::RunOptions {
                limit: *limit,
                output: output.clone(),
                submit: *submit,
                username: username.clone(),
                agent_code: agent_code.clone(),
            };
            commands::run_all(options, settings).await?;
        }

        Commands::Questions => {
            commands::run_questions(settings).await?;
        }

        Commands::Ask {
            question,
            file_name,
            task_id,
        } => {
            commands::run_ask(question, file_name.clone(), task_id, settings).await?;
        }

        Commands::Submit {
            report,
            username,
            agent_code,
        } => {
            commands::run_submit(report, username, agent_code, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
