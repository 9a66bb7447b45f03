//! Implementation of the `railgen generate` command.
//!
//! Responsibility: resolve a `ProjectConfig`, wire the adapters into a
//! `ScaffoldService`, hook signals and panics into its coordinator, run it
//! and display results. No generation logic lives here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use railgen_adapters::{InMemoryStore, LocalFilesystem, SimpleRenderer, SystemCommandRunner};
use railgen_core::{
    application::{Decision, GenerationSummary, RunFailure, ScaffoldService, generators::steps_for},
    domain::ProjectConfig,
    error::ErrorCategory,
};

use crate::{
    cli::{GenerateArgs, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::{OutputManager, StepProgress},
    prompts, signals,
};

const RAILS_URL: &str = "http://localhost:3000";

/// Execute the `railgen generate` command.
///
/// Dispatch sequence:
/// 1. Build the service and install signal/panic hooks
/// 2. Resolve the configuration (flags, `--yes`, or prompts)
/// 3. Show it, and confirm if it came from prompts
/// 4. Generate; failures are already rolled back when they surface here
/// 5. Print next steps and access points
#[instrument(skip_all, fields(project = args.name.as_deref().unwrap_or("")))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let cwd = std::env::current_dir().with_cli_context(|| "cannot read the working directory")?;

    let progress = Arc::new(output.progress());
    let service = build_service(&config, &cwd, progress.clone())?;
    signals::install(service.coordinator().clone())?;

    output.header("\u{1f680} Rails React GraphQL Project Generator")?;

    let resolved = prompts::resolve(&args, &config.defaults, &cwd)?;
    let project = resolved.config;

    output.print("")?;
    output.header("Project Configuration")?;
    output.table(&configuration_rows(&project))?;
    output.print("")?;

    if resolved.prompted && !prompts::confirm("Generate project with this configuration?")? {
        return Err(CliError::Cancelled);
    }

    let steps = steps_for(&project);
    progress.set_total(steps.len());
    info!(
        project = %project.project_name,
        path = %project.project_path.display(),
        steps = steps.len(),
        "Generation started"
    );

    match service.generate_with(&project, &steps, progress.as_ref()) {
        Ok(summary) => {
            info!(run_id = %summary.run_id, files = summary.files, "Generation completed");
            report_success(&project, &summary, &global, &output)
        }
        Err(failure) => Err(failed(failure)),
    }
}

fn build_service(
    config: &AppConfig,
    cwd: &Path,
    progress: Arc<StepProgress>,
) -> CliResult<ScaffoldService> {
    let store = Arc::new(InMemoryStore::with_builtin()?);
    Ok(ScaffoldService::new(
        store,
        Arc::new(SimpleRenderer::new()),
        Arc::new(LocalFilesystem::new()),
        Arc::new(SystemCommandRunner::new()),
        progress,
        config.backup_root(cwd),
    ))
}

/// Map a rolled-back run onto the CLI error and exit status.
fn failed(failure: RunFailure) -> CliError {
    let RunFailure {
        error,
        decision,
        rollback,
    } = failure;

    // A signal emptied the slot under us; its handler is rolling back and
    // will exit the process itself.
    if error.category() == ErrorCategory::Interrupted {
        signals::wait_for_shutdown();
        return CliError::Cancelled;
    }

    let exit_code = match decision {
        Decision::Terminate(code) => code,
        Decision::Continue => error.category().exit_code(),
    };
    CliError::RunFailed {
        error,
        exit_code,
        rollback,
    }
}

fn yes_no(on: bool) -> String {
    if on { "Yes" } else { "No" }.to_string()
}

fn configuration_rows(project: &ProjectConfig) -> Vec<(&'static str, String)> {
    let f = &project.features;
    vec![
        ("Project Name", project.project_name.clone()),
        ("Location", project.project_path.display().to_string()),
        ("Rails Version", project.rails_version.to_string()),
        ("React Version", project.react_version.to_string()),
        ("Database", project.database.to_string()),
        ("TypeScript", yes_no(f.typescript)),
        ("Testing", yes_no(f.testing)),
        ("Linting", yes_no(f.linting)),
        ("Authentication", yes_no(f.authentication)),
        ("API Docs", yes_no(f.api_documentation)),
        ("Docker", yes_no(f.docker)),
        ("Git", yes_no(f.git)),
        ("Build Tool", project.build_tool.to_string()),
        ("Package Manager", project.package_manager.to_string()),
    ]
}

/// Commands to run after generation, in order.
pub fn next_steps(project: &ProjectConfig) -> Vec<String> {
    let pm = project.package_manager;
    let mut steps = vec![
        format!("cd {}", project.project_name),
        "cd backend && bundle install && bin/rails db:prepare && cd ..".to_string(),
        format!("cd frontend && {} install && cd ..", pm.as_str()),
    ];
    if project.features.docker {
        steps.push("docker compose up".into());
    } else {
        steps.push("cd backend && bin/rails server".into());
        steps.push(format!("cd frontend && {} dev", pm.run_prefix()));
    }
    steps
}

/// Where the running services can be reached.
pub fn access_points(project: &ProjectConfig) -> Vec<(&'static str, String)> {
    let mut points = vec![
        ("Rails API", RAILS_URL.to_string()),
        (
            "React App",
            format!("http://localhost:{}", project.build_tool.dev_port()),
        ),
        ("GraphQL Playground", format!("{RAILS_URL}/graphiql")),
    ];
    if project.features.api_documentation {
        points.push(("API Docs", format!("{RAILS_URL}/api-docs")));
    }
    points
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    run_id: String,
    project_path: &'a Path,
    files: usize,
    directories: usize,
    git_initialized: bool,
    next_steps: Vec<String>,
}

fn report_success(
    project: &ProjectConfig,
    summary: &GenerationSummary,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<()> {
    output.json(&SummaryJson {
        run_id: summary.run_id.to_string(),
        project_path: &summary.project_path,
        files: summary.files,
        directories: summary.directories,
        git_initialized: summary.git_initialized,
        next_steps: next_steps(project),
    })?;

    output.print("")?;
    output.success("\u{1f389} Your Rails React GraphQL project is ready!")?;
    if global.verbose > 0 {
        output.info(&format!(
            "{} files and {} directories written to {}",
            summary.files,
            summary.directories,
            display_relative(&summary.project_path)
        ))?;
    }

    output.print("")?;
    output.header("Next Steps")?;
    output.list(&next_steps(project))?;

    output.print("")?;
    output.header("Access Points")?;
    output.table(&access_points(project))?;
    Ok(())
}

fn display_relative(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(PathBuf::from))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use railgen_core::{
        application::ApplicationError,
        domain::{GenerateOptions, PackageManager},
        error::RailgenError,
    };

    fn project(options: GenerateOptions) -> ProjectConfig {
        ProjectConfig::resolve("my-shop", &options, Path::new("/work")).unwrap()
    }

    #[test]
    fn next_steps_start_in_the_project() {
        let steps = next_steps(&project(GenerateOptions::default()));
        assert_eq!(steps[0], "cd my-shop");
        assert!(steps.iter().any(|s| s.contains("pnpm install")));
        assert_eq!(steps.last().map(String::as_str), Some("docker compose up"));
    }

    #[test]
    fn next_steps_without_docker_use_package_manager_scripts() {
        let mut options = GenerateOptions {
            package_manager: Some("npm".into()),
            ..GenerateOptions::default()
        };
        options.features.docker = false;
        let p = project(options);
        assert_eq!(p.package_manager, PackageManager::Npm);

        let steps = next_steps(&p);
        assert!(steps.iter().any(|s| s.contains("npm run dev")));
        assert!(!steps.iter().any(|s| s.contains("docker")));
    }

    #[test]
    fn access_points_follow_build_tool() {
        let vite = access_points(&project(GenerateOptions::default()));
        assert!(vite.iter().any(|(_, url)| url == "http://localhost:5173"));
        assert!(vite.iter().any(|(_, url)| url == "http://localhost:3000/graphiql"));

        let webpack = access_points(&project(GenerateOptions {
            build_tool: Some("webpack".into()),
            ..GenerateOptions::default()
        }));
        assert!(webpack.iter().any(|(_, url)| url == "http://localhost:8080"));
    }

    #[test]
    fn api_docs_point_only_when_enabled() {
        let mut options = GenerateOptions::default();
        options.features.api_documentation = false;
        let points = access_points(&project(options));
        assert!(!points.iter().any(|(name, _)| *name == "API Docs"));
    }

    #[test]
    fn failed_run_keeps_coordinator_exit_code() {
        let err = failed(RunFailure {
            error: ApplicationError::GenerationFailed {
                step: "backend".into(),
                reason: "boom".into(),
            }
            .into(),
            decision: Decision::Terminate(1),
            rollback: None,
        });
        assert!(matches!(err, CliError::RunFailed { exit_code: 1, .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn incomplete_rollback_travels_with_the_failure() {
        let err = failed(RunFailure {
            error: ApplicationError::GenerationFailed {
                step: "docker".into(),
                reason: "boom".into(),
            }
            .into(),
            decision: Decision::Terminate(1),
            rollback: Some(ApplicationError::RollbackFailed {
                failed_steps: vec!["remove-target".into()],
                indeterminate: vec![PathBuf::from("/w/shop")],
                snapshot: None,
            }),
        });
        assert!(matches!(
            err,
            CliError::RunFailed {
                rollback: Some(ApplicationError::RollbackFailed { .. }),
                ..
            }
        ));
        assert!(err.suggestions().iter().any(|s| s.contains("/w/shop")));
    }

    #[test]
    fn refused_run_is_a_usage_error() {
        let err = failed(RunFailure {
            error: RailgenError::from(ApplicationError::RunInProgress {
                run_id: Default::default(),
            }),
            decision: Decision::Terminate(2),
            rollback: None,
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn interrupted_run_exits_zero() {
        let err = failed(RunFailure {
            error: ApplicationError::RunAborted.into(),
            decision: Decision::Terminate(1),
            rollback: None,
        });
        assert!(matches!(err, CliError::Cancelled));
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn configuration_rows_cover_every_toggle() {
        let rows = configuration_rows(&project(GenerateOptions::default()));
        let toggles = [
            "TypeScript",
            "Testing",
            "Linting",
            "Authentication",
            "API Docs",
            "Docker",
            "Git",
        ];
        for key in toggles {
            assert!(rows.iter().any(|(k, v)| *k == key && v == "Yes"), "{key}");
        }
    }
}
