//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `RAILGEN_<SECTION>__<KEY>`, e.g.
//!    `RAILGEN_DEFAULTS__DATABASE=sqlite`
//! 3. Config file: `--config FILE` (must exist) or [`AppConfig::config_path`]
//!    (optional)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use railgen_core::{
    application::services::DEFAULT_BACKUP_DIR,
    domain::config::{DEFAULT_RAILS_VERSION, DEFAULT_REACT_VERSION},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fallback values for `generate` options not given on the command line.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Where pre-generation snapshots are kept.
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub rails_version: String,
    pub react_version: String,
    pub database: String,
    pub build_tool: String,
    pub package_manager: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            rails_version: DEFAULT_RAILS_VERSION.into(),
            react_version: DEFAULT_REACT_VERSION.into(),
            database: "postgresql".into(),
            build_tool: "vite".into(),
            package_manager: "pnpm".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory name created under the working directory.
    pub root_dir_name: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            root_dir_name: DEFAULT_BACKUP_DIR.into(),
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let file = match config_file {
            Some(path) => File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(true),
            None => File::from(Self::config_path())
                .format(FileFormat::Toml)
                .required(false),
        };

        let loaded: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("RAILGEN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| CliError::ConfigError {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        debug!(?loaded, "Configuration loaded");
        Ok(loaded)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.railgen.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "railgen", "railgen")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".railgen.toml"))
    }

    /// Backup root for runs started in `cwd`.
    pub fn backup_root(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.backup.root_dir_name)
    }

    /// Look up a dotted key such as `defaults.database`.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let tree = serde_json::to_value(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        let value = key
            .split('.')
            .try_fold(&tree, |node, part| node.get(part))
            .filter(|v| !v.is_object())
            .ok_or_else(|| CliError::ConfigError {
                message: format!("Unknown config key: '{key}'"),
                source: None,
            })?;

        Ok(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Every leaf key, in declaration order.
    pub fn keys() -> [&'static str; 7] {
        [
            "defaults.rails_version",
            "defaults.react_version",
            "defaults.database",
            "defaults.build_tool",
            "defaults.package_manager",
            "output.no_color",
            "backup.root_dir_name",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_generator_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.defaults.rails_version, "7.1.0");
        assert_eq!(cfg.defaults.react_version, "18.2.0");
        assert_eq!(cfg.defaults.database, "postgresql");
        assert_eq!(cfg.backup.root_dir_name, ".railgen-backup");
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn file_values_override_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("railgen.toml");
        fs::write(
            &path,
            "[defaults]\ndatabase = \"sqlite\"\n\n[backup]\nroot_dir_name = \".snapshots\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.database, "sqlite");
        assert_eq!(cfg.defaults.rails_version, "7.1.0");
        assert_eq!(cfg.backup_root(Path::new("/work")), PathBuf::from("/work/.snapshots"));
    }

    #[test]
    fn explicit_missing_file_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, CliError::ConfigError { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn malformed_file_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[defaults\ndatabase = ").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn every_listed_key_resolves() {
        let cfg = AppConfig::default();
        for key in AppConfig::keys() {
            assert!(cfg.get(key).is_ok(), "{key}");
        }
        assert_eq!(cfg.get("output.no_color").unwrap(), "false");
    }

    #[test]
    fn sections_and_unknown_keys_are_rejected() {
        let cfg = AppConfig::default();
        assert!(cfg.get("defaults").is_err());
        assert!(cfg.get("defaults.lang").is_err());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
