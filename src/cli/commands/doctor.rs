//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use console::style;
use std::path::Path;
use std::process::Command;

use super::scoring_client;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Svar Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Video tooling is optional; only run_video needs it
    println!("{}", style("External Tools (video)").bold());
    let tool_checks = vec![
        check_tool("yt-dlp", &["--version"], install_hint_ytdlp()),
        check_tool("ffmpeg", &["-version"], install_hint_ffmpeg()),
        check_tool("ffprobe", &["-version"], install_hint_ffmpeg()),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("API Configuration").bold());
    let api_check = check_openai_api_key();
    api_check.print();
    checks.push(api_check);

    let scoring_check = check_scoring_service(settings).await;
    scoring_check.print();
    checks.push(scoring_check);

    println!();

    println!("{}", style("Agent").bold());
    let agent_check = check_agent(settings);
    agent_check.print();
    checks.push(agent_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Svar.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Svar is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available. Missing tools are warnings.
fn check_tool(name: &str, args: &[&str], hint: &str) -> CheckResult {
    match Command::new(name).args(args).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::warning(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, "not found (video tool unavailable)", hint)
        }
        Err(e) => CheckResult::warning(name, &format!("error: {}", e), hint),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check that the scoring service answers with a question list.
async fn check_scoring_service(settings: &Settings) -> CheckResult {
    let client = scoring_client(settings);
    let hint = "Check api.base_url in the config or pass --api-url";

    match client.fetch_questions().await {
        Ok(questions) => CheckResult::ok(
            "Scoring service",
            &format!("{} ({} questions)", client.base_url(), questions.len()),
        ),
        Err(SvarError::EmptyQuestionList) => CheckResult::warning(
            "Scoring service",
            &format!("{} returned no questions", client.base_url()),
            hint,
        ),
        Err(e) => CheckResult::error("Scoring service", &e.to_string(), hint),
    }
}

/// Summarize the agent model and enabled tools.
fn check_agent(settings: &Settings) -> CheckResult {
    let agent = &settings.agent;
    if agent.capabilities.is_empty() {
        return CheckResult::warning(
            "Model",
            &format!("{} with no tools", agent.model),
            "Add capabilities under [agent] in the config",
        );
    }

    let tools = agent
        .capabilities
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    CheckResult::ok(
        "Model",
        &format!("{} ({} steps max; tools: {})", agent.model, agent.max_steps, tools),
    )
}

/// Check if the config file in use exists and parses.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        if let Err(e) = Settings::load_from(Some(&config_path.to_path_buf())) {
            return CheckResult::error(
                "Config file",
                &format!("{}: {}", config_path.display(), e),
                "Fix with: svar config edit",
            );
        }
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: svar config edit",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_tool_is_warning() {
        let result = check_tool("svar-missing-binary", &["--version"], "install it");
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[test]
    fn test_agent_without_tools_warns() {
        let mut settings = Settings::default();
        settings.agent.capabilities.clear();
        assert_eq!(check_agent(&settings).status, CheckStatus::Warning);
        assert_eq!(check_agent(&Settings::default()).status, CheckStatus::Ok);
    }

    #[test]
    fn test_config_file_check_uses_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svar.toml");
        assert_eq!(check_config_file(&path).status, CheckStatus::Warning);

        std::fs::write(&path, "[agent]\nmax_steps = 5\n").unwrap();
        assert_eq!(check_config_file(&path).status, CheckStatus::Ok);

        std::fs::write(&path, "[agent\n").unwrap();
        assert_eq!(check_config_file(&path).status, CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_scoring_service_check() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/questions")
            .with_status(200)
            .with_body(r#"[{"task_id": "1", "question": "Q"}]"#)
            .create_async()
            .await;

        let mut settings = Settings::default();
        settings.api.base_url = server.url();
        let result = check_scoring_service(&settings).await;
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.message.contains("1 questions"));
    }
}
