use tracing::info;

use super::{GeneratorStep, RunContext};
use crate::{
    domain::{Component, ProjectConfig},
    error::RailgenResult,
};

/// Rails API backend under `backend/`.
pub struct BackendStep;

impl GeneratorStep for BackendStep {
    fn name(&self) -> &'static str {
        "backend"
    }

    fn description(&self, config: &ProjectConfig) -> String {
        format!("Creating Rails {} API application", config.rails_version)
    }

    fn run(&self, ctx: &mut RunContext) -> RailgenResult<()> {
        let written = ctx.materialize(Component::Backend)?;
        info!(entries = written, "Rails backend generated");
        Ok(())
    }
}

/// React frontend under `frontend/`.
pub struct FrontendStep;

impl GeneratorStep for FrontendStep {
    fn name(&self) -> &'static str {
        "frontend"
    }

    fn description(&self, config: &ProjectConfig) -> String {
        let lang = if config.features.typescript {
            "TypeScript"
        } else {
            "JavaScript"
        };
        format!("Setting up React with {lang} ({})", config.build_tool)
    }

    fn run(&self, ctx: &mut RunContext) -> RailgenResult<()> {
        let written = ctx.materialize(Component::Frontend)?;
        info!(entries = written, "React frontend generated");
        Ok(())
    }
}

/// GraphQL schema, types and Apollo client wiring.
pub struct GraphqlStep;

impl GeneratorStep for GraphqlStep {
    fn name(&self) -> &'static str {
        "graphql"
    }

    fn description(&self, _config: &ProjectConfig) -> String {
        "Configuring GraphQL server and client".into()
    }

    fn run(&self, ctx: &mut RunContext) -> RailgenResult<()> {
        ctx.materialize(Component::Graphql)?;
        Ok(())
    }
}

pub struct DockerStep;

impl GeneratorStep for DockerStep {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn description(&self, _config: &ProjectConfig) -> String {
        "Creating Docker and Docker Compose files".into()
    }

    fn run(&self, ctx: &mut RunContext) -> RailgenResult<()> {
        ctx.materialize(Component::Docker)?;
        Ok(())
    }
}

/// Writes `.gitignore` and initializes a repository at the project root.
pub struct GitStep;

impl GeneratorStep for GitStep {
    fn name(&self) -> &'static str {
        "git"
    }

    fn description(&self, _config: &ProjectConfig) -> String {
        "Initializing Git repository".into()
    }

    fn run(&self, ctx: &mut RunContext) -> RailgenResult<()> {
        ctx.materialize(Component::Git)?;
        ctx.run_command("git", &["init", "--quiet"])?;
        ctx.mark_git_initialized();
        info!(path = %ctx.project_path().display(), "Git repository initialized");
        Ok(())
    }
}
