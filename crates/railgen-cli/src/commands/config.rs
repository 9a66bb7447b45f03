//! `railgen config`: inspect configuration values.

use crate::{
    cli::{ConfigCommands, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            output.json(&serde_json::json!({ "key": key, "value": value }))?;
            output.print(&value)?;
        }

        ConfigCommands::List => match output.format() {
            OutputFormat::Json => output.json(&config)?,
            OutputFormat::Human => {
                output.header("Current Configuration:")?;
                output.print(&to_toml(&config)?)?;
            }
            _ => {
                for line in key_value_lines(&config)? {
                    output.print(&line)?;
                }
            }
        },

        ConfigCommands::Path => {
            let path = AppConfig::config_path();
            output.json(&serde_json::json!({ "path": path }))?;
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}

fn to_toml(config: &AppConfig) -> CliResult<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })
}

/// `key = value` for every leaf, for pipes and scripts.
fn key_value_lines(config: &AppConfig) -> CliResult<Vec<String>> {
    AppConfig::keys()
        .into_iter()
        .map(|key| Ok(format!("{key} = {}", config.get(key)?)))
        .collect()
}

// ── tests ─────────────────────────────────────────────────────────────────────
