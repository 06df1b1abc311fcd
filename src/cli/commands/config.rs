//! Config command: show, edit or locate the settings file in use.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the config command against the file that `settings` was loaded from.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(&settings)
                .context("Failed to serialize config")?;
            println!("# {}", config_path.display());
            println!("{}", rendered);
        }

        ConfigAction::Edit => {
            if ensure_config_file(config_path)? {
                Output::info(&format!("Created default config at {}", config_path.display()));
            }

            let editor = editor_command(
                std::env::var("VISUAL").ok(),
                std::env::var("EDITOR").ok(),
            );
            Output::info(&format!("Opening {} in {}...", config_path.display(), editor));

            match std::process::Command::new(&editor).arg(config_path).status() {
                Ok(status) if status.success() => {
                    // Reject edits that no longer parse.
                    Settings::load_from(Some(&config_path.to_path_buf()))
                        .with_context(|| format!("{} is not valid", config_path.display()))?;
                    Output::success("Config saved.");
                }
                Ok(status) => Output::warning(&format!("Editor exited with {}.", status)),
                Err(e) => {
                    Output::error(&format!("Failed to open editor '{}': {}", editor, e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Write default settings to `path` unless it exists. Returns whether it wrote.
fn ensure_config_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    Settings::default()
        .save_to(&path.to_path_buf())
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(true)
}

/// `$VISUAL`, then `$EDITOR`, then `vi`.
fn editor_command(visual: Option<String>, editor: Option<String>) -> String {
    visual
        .into_iter()
        .chain(editor)
        .find(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_config_at_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci").join("svar.toml");

        assert!(ensure_config_file(&path).unwrap());
        assert!(path.exists());
        assert!(!ensure_config_file(&path).unwrap());

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.model, Settings::default().agent.model);
    }

    #[test]
    fn test_existing_config_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci.toml");
        std::fs::write(&path, "[agent]\nmodel = \"custom\"\n").unwrap();

        assert!(!ensure_config_file(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[agent]\nmodel = \"custom\"\n"
        );
    }

    #[test]
    fn test_path_and_show_use_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci.toml");

        run_config(&ConfigAction::Path, Settings::default(), &path).unwrap();
        run_config(&ConfigAction::Show, Settings::default(), &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_editor_command_precedence() {
        assert_eq!(editor_command(Some("hx".into()), Some("nano".into())), "hx");
        assert_eq!(editor_command(Some(" ".into()), Some("nano".into())), "nano");
        assert_eq!(editor_command(None, None), "vi");
    }
}
