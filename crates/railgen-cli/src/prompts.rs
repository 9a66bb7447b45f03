//! Turning `generate` arguments into a validated [`ProjectConfig`].
//!
//! Three routes, checked in order:
//! 1. `--yes`: defaults for everything not given on the command line.
//! 2. NAME, `--rails-version`, `--react-version` and `--database` all given:
//!    build straight from flags.
//! 3. Otherwise ask, pre-filling answers from flags and config defaults.
//!    Only this route asks for confirmation afterwards.
//!
//! Flags are validated up front on every route, so a bad `--database` is
//! reported before any prompt appears.

use std::path::Path;

use railgen_core::domain::{
    Features, GenerateOptions, ProjectConfig, config::DEFAULT_PROJECT_NAME,
};
use tracing::debug;

use crate::{
    cli::GenerateArgs,
    config::Defaults,
    error::{CliError, CliResult},
};

/// A resolved configuration and how it was obtained.
#[derive(Debug)]
pub struct Resolved {
    pub config: ProjectConfig,
    /// `true` when the answers came from interactive prompts.
    pub prompted: bool,
}

/// Raw options exactly as given on the command line.
pub fn options_from_args(args: &GenerateArgs) -> GenerateOptions {
    GenerateOptions {
        rails_version: args.rails_version.clone(),
        react_version: args.react_version.clone(),
        database: args.database.clone(),
        build_tool: args.build_tool.clone(),
        package_manager: args.package_manager.clone(),
        features: Features {
            typescript: !args.no_typescript,
            testing: !args.no_testing,
            linting: !args.no_linting,
            authentication: !args.no_authentication,
            api_documentation: !args.no_api_docs,
            git: !args.no_git,
            docker: !args.no_docker,
        },
    }
}

/// Fill every option the user did not give from the configured defaults.
pub fn with_defaults(mut options: GenerateOptions, defaults: &Defaults) -> GenerateOptions {
    options
        .rails_version
        .get_or_insert_with(|| defaults.rails_version.clone());
    options
        .react_version
        .get_or_insert_with(|| defaults.react_version.clone());
    options
        .database
        .get_or_insert_with(|| defaults.database.clone());
    options
        .build_tool
        .get_or_insert_with(|| defaults.build_tool.clone());
    options
        .package_manager
        .get_or_insert_with(|| defaults.package_manager.clone());
    options
}

/// Whether flags alone are enough to skip the prompts.
pub fn has_all_required_flags(args: &GenerateArgs) -> bool {
    args.name.is_some()
        && args.rails_version.is_some()
        && args.react_version.is_some()
        && args.database.is_some()
}

/// Resolve the configuration for a run rooted at `cwd`.
pub fn resolve(args: &GenerateArgs, defaults: &Defaults, cwd: &Path) -> CliResult<Resolved> {
    let flags = options_from_args(args);
    flags.validate().map_err(|e| CliError::Core(e.into()))?;

    if args.yes || has_all_required_flags(args) {
        let name = args.name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME);
        debug!(name, yes = args.yes, "Resolving configuration from flags");
        let config = ProjectConfig::resolve(name, &with_defaults(flags, defaults), cwd)
            .map_err(|e| CliError::Core(e.into()))?;
        return Ok(Resolved {
            config,
            prompted: false,
        });
    }

    let (name, options) = ask(args.name.as_deref(), with_defaults(flags, defaults), cwd)?;
    let config =
        ProjectConfig::resolve(&name, &options, cwd).map_err(|e| CliError::Core(e.into()))?;
    Ok(Resolved {
        config,
        prompted: true,
    })
}

#[cfg(feature = "interactive")]
mod interactive {
    use std::io::{self, IsTerminal};
    use std::path::Path;

    use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
    use railgen_core::domain::{
        Database, GenerateOptions, Version, config::DEFAULT_PROJECT_NAME,
        config::validate_project_name,
    };

    use crate::error::{CliError, CliResult};

    fn prompt_failed(e: dialoguer::Error) -> CliError {
        CliError::IoError {
            message: "prompt failed".into(),
            source: io::Error::other(e),
        }
    }

    fn ensure_terminal() -> CliResult<()> {
        if io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(CliError::NotInteractive)
        }
    }

    fn version(theme: &ColorfulTheme, prompt: &str, default: String) -> CliResult<String> {
        Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .default(default)
            .validate_with(|input: &String| -> Result<(), String> {
                Version::parse("version", input)
                    .map(|_| ())
                    .map_err(|_| "Please enter a valid version number (e.g., 7.1.0)".into())
            })
            .interact_text()
            .map_err(prompt_failed)
    }

    fn toggle(theme: &ColorfulTheme, prompt: &str, default: bool) -> CliResult<bool> {
        Confirm::with_theme(theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_failed)
    }

    fn choose(
        theme: &ColorfulTheme,
        prompt: &str,
        labels: &[&str],
        values: &[&str],
        current: Option<&str>,
    ) -> CliResult<String> {
        let default = current
            .and_then(|c| values.iter().position(|v| v.eq_ignore_ascii_case(c)))
            .unwrap_or(0);
        let picked = Select::with_theme(theme)
            .with_prompt(prompt)
            .items(labels)
            .default(default)
            .interact()
            .map_err(prompt_failed)?;
        Ok(values[picked].to_string())
    }

    pub fn ask(
        name: Option<&str>,
        mut options: GenerateOptions,
        cwd: &Path,
    ) -> CliResult<(String, GenerateOptions)> {
        ensure_terminal()?;
        let theme = ColorfulTheme::default();

        let name = Input::<String>::with_theme(&theme)
            .with_prompt("What is the name of your project?")
            .default(name.unwrap_or(DEFAULT_PROJECT_NAME).to_string())
            .validate_with(|input: &String| -> Result<(), String> {
                validate_project_name(input).map_err(|e| e.to_string())?;
                if cwd.join(input).exists() {
                    return Err(format!("Directory \"{input}\" already exists"));
                }
                Ok(())
            })
            .interact_text()
            .map_err(prompt_failed)?;

        let databases: Vec<&str> = Database::ALL.iter().map(Database::as_str).collect();
        options.database = Some(choose(
            &theme,
            "Which database would you like to use?",
            &["PostgreSQL (Recommended)", "SQLite (Development only)"],
            &databases,
            options.database.as_deref(),
        )?);

        options.rails_version = Some(version(
            &theme,
            "What Rails version would you like to use?",
            options.rails_version.take().unwrap_or_default(),
        )?);
        options.react_version = Some(version(
            &theme,
            "What React version would you like to use?",
            options.react_version.take().unwrap_or_default(),
        )?);

        let f = &mut options.features;
        f.typescript = toggle(&theme, "Would you like to use TypeScript?", f.typescript)?;
        f.testing = toggle(&theme, "Would you like to include testing setup?", f.testing)?;
        f.linting = toggle(&theme, "Would you like to include linting and formatting?", f.linting)?;
        f.authentication = toggle(
            &theme,
            "Would you like to include authentication boilerplate?",
            f.authentication,
        )?;
        f.api_documentation = toggle(
            &theme,
            "Would you like to include API documentation setup?",
            f.api_documentation,
        )?;
        f.git = toggle(&theme, "Would you like to initialize a Git repository?", f.git)?;
        f.docker = toggle(&theme, "Would you like to include Docker configuration?", f.docker)?;

        options.build_tool = Some(choose(
            &theme,
            "Which build tool would you like to use for React?",
            &["Vite (Recommended)", "Webpack"],
            &["vite", "webpack"],
            options.build_tool.as_deref(),
        )?);
        options.package_manager = Some(choose(
            &theme,
            "Which package manager would you like to use?",
            &["pnpm (Recommended)", "npm", "yarn"],
            &["pnpm", "npm", "yarn"],
            options.package_manager.as_deref(),
        )?);

        Ok((name, options))
    }

    pub fn confirm(prompt: &str) -> CliResult<bool> {
        ensure_terminal()?;
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(prompt_failed)
    }
}

#[cfg(feature = "interactive")]
use interactive::ask;
#[cfg(feature = "interactive")]
pub use interactive::confirm;

#[cfg(not(feature = "interactive"))]
fn ask(
    _name: Option<&str>,
    _options: GenerateOptions,
    _cwd: &Path,
) -> CliResult<(String, GenerateOptions)> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

#[cfg(not(feature = "interactive"))]
pub fn confirm(_prompt: &str) -> CliResult<bool> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use railgen_core::domain::{BuildTool, Database, PackageManager};
    use std::path::PathBuf;

    fn args(name: Option<&str>) -> GenerateArgs {
        GenerateArgs {
            name: name.map(String::from),
            ..GenerateArgs::default()
        }
    }

    #[test]
    fn yes_uses_defaults_and_default_name() {
        let a = GenerateArgs {
            yes: true,
            ..args(None)
        };
        let r = resolve(&a, &Defaults::default(), Path::new("/work")).unwrap();
        assert!(!r.prompted);
        assert_eq!(r.config.project_name, "my-rails-react-app");
        assert_eq!(r.config.project_path, PathBuf::from("/work/my-rails-react-app"));
        assert_eq!(r.config.rails_version.as_str(), "7.1.0");
        assert_eq!(r.config.database, Database::Postgresql);
        assert_eq!(r.config.build_tool, BuildTool::Vite);
        assert_eq!(r.config.package_manager, PackageManager::Pnpm);
        assert_eq!(r.config.features, Features::default());
    }

    #[test]
    fn yes_still_honours_flags() {
        let a = GenerateArgs {
            yes: true,
            database: Some("sqlite".into()),
            react_version: Some("18.3.1".into()),
            no_docker: true,
            no_typescript: true,
            ..args(Some("shop"))
        };
        let r = resolve(&a, &Defaults::default(), Path::new("/work")).unwrap();
        assert_eq!(r.config.database, Database::Sqlite);
        assert_eq!(r.config.react_version.as_str(), "18.3.1");
        assert!(!r.config.features.docker);
        assert!(!r.config.features.typescript);
        assert!(r.config.features.git);
    }

    #[test]
    fn config_defaults_fill_unset_options() {
        let defaults = Defaults {
            database: "sqlite".into(),
            package_manager: "yarn".into(),
            ..Defaults::default()
        };
        let a = GenerateArgs {
            yes: true,
            ..args(Some("shop"))
        };
        let r = resolve(&a, &defaults, Path::new("/work")).unwrap();
        assert_eq!(r.config.database, Database::Sqlite);
        assert_eq!(r.config.package_manager, PackageManager::Yarn);
    }

    #[test]
    fn complete_flags_skip_prompts() {
        let a = GenerateArgs {
            rails_version: Some("7.0.8".into()),
            react_version: Some("18.2.0".into()),
            database: Some("postgresql".into()),
            ..args(Some("shop"))
        };
        assert!(has_all_required_flags(&a));
        let r = resolve(&a, &Defaults::default(), Path::new("/work")).unwrap();
        assert!(!r.prompted);
        assert_eq!(r.config.rails_version.as_str(), "7.0.8");
    }

    #[test]
    fn missing_database_flag_needs_prompts() {
        let a = GenerateArgs {
            rails_version: Some("7.0.8".into()),
            react_version: Some("18.2.0".into()),
            ..args(Some("shop"))
        };
        assert!(!has_all_required_flags(&a));
    }

    #[test]
    fn bad_flags_fail_before_any_prompt() {
        let a = GenerateArgs {
            rails_version: Some("7.1".into()),
            database: Some("mysql".into()),
            ..args(None)
        };
        let err = resolve(&a, &Defaults::default(), Path::new("/work")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("7.1"), "{msg}");
        assert!(msg.contains("mysql"), "{msg}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_name_is_a_validation_error() {
        let a = GenerateArgs {
            yes: true,
            ..args(Some("My_App"))
        };
        let err = resolve(&a, &Defaults::default(), Path::new("/work")).unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn with_defaults_keeps_given_values() {
        let options = GenerateOptions {
            database: Some("sqlite".into()),
            ..GenerateOptions::default()
        };
        let filled = with_defaults(options, &Defaults::default());
        assert_eq!(filled.database.as_deref(), Some("sqlite"));
        assert_eq!(filled.rails_version.as_deref(), Some("7.1.0"));
        assert_eq!(filled.build_tool.as_deref(), Some("vite"));
    }
}
