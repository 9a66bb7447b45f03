//! Project configuration: the fully validated input to a generation run.
//!
//! Raw, user-supplied values arrive as [`GenerateOptions`] (strings straight
//! from flags or prompts). [`ProjectConfig::resolve`] validates every field,
//! collecting all violations before reporting, so a user fixing flags sees
//! every problem at once. Nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{BuildTool, Database, PackageManager, Version},
};

pub const DEFAULT_PROJECT_NAME: &str = "my-rails-react-app";
pub const DEFAULT_RAILS_VERSION: &str = "7.1.0";
pub const DEFAULT_REACT_VERSION: &str = "18.2.0";
pub const RUBY_VERSION: &str = "3.2.2";

/// Feature toggles. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub typescript: bool,
    pub testing: bool,
    pub linting: bool,
    pub authentication: bool,
    pub api_documentation: bool,
    pub git: bool,
    pub docker: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            typescript: true,
            testing: true,
            linting: true,
            authentication: true,
            api_documentation: true,
            git: true,
            docker: true,
        }
    }
}

/// Unvalidated generation options as collected from flags or prompts.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub rails_version: Option<String>,
    pub react_version: Option<String>,
    pub database: Option<String>,
    pub build_tool: Option<String>,
    pub package_manager: Option<String>,
    pub features: Features,
}

impl GenerateOptions {
    /// Validate only the values that were actually supplied.
    ///
    /// Mirrors what the flag parser can check before any prompt runs.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if let Some(v) = &self.rails_version {
            push_err(&mut errors, Version::parse("Rails version", v));
        }
        if let Some(v) = &self.react_version {
            push_err(&mut errors, Version::parse("React version", v));
        }
        if let Some(v) = &self.database {
            push_err(&mut errors, v.parse::<Database>());
        }
        if let Some(v) = &self.build_tool {
            push_err(&mut errors, v.parse::<BuildTool>());
        }
        if let Some(v) = &self.package_manager {
            push_err(&mut errors, v.parse::<PackageManager>());
        }
        DomainError::collect(errors)
    }
}

/// Validated configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_name: String,
    /// Absolute path of the project root.
    pub project_path: PathBuf,
    pub rails_version: Version,
    pub react_version: Version,
    pub database: Database,
    pub features: Features,
    pub build_tool: BuildTool,
    pub package_manager: PackageManager,
}

impl ProjectConfig {
    /// Build a configuration from raw options, falling back to defaults for
    /// anything not supplied.
    ///
    /// `base_dir` is the directory the project is created in; the project
    /// path is `base_dir/project_name`.
    pub fn resolve(
        project_name: &str,
        options: &GenerateOptions,
        base_dir: &Path,
    ) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        if let Err(e) = validate_project_name(project_name) {
            errors.push(e);
        }

        let rails_version = Version::parse(
            "Rails version",
            options.rails_version.as_deref().unwrap_or(DEFAULT_RAILS_VERSION),
        );
        let react_version = Version::parse(
            "React version",
            options.react_version.as_deref().unwrap_or(DEFAULT_REACT_VERSION),
        );
        let database = options
            .database
            .as_deref()
            .map_or(Ok(Database::default()), |s| s.parse::<Database>());
        let build_tool = options
            .build_tool
            .as_deref()
            .map_or(Ok(BuildTool::default()), |s| s.parse::<BuildTool>());
        let package_manager = options
            .package_manager
            .as_deref()
            .map_or(Ok(PackageManager::default()), |s| {
                s.parse::<PackageManager>()
            });

        match (rails_version, react_version, database, build_tool, package_manager) {
            (Ok(rails), Ok(react), Ok(db), Ok(bt), Ok(pm)) if errors.is_empty() => Ok(Self {
                project_name: project_name.to_string(),
                project_path: base_dir.join(project_name),
                rails_version: rails,
                react_version: react,
                database: db,
                features: options.features,
                build_tool: bt,
                package_manager: pm,
            }),
            (rails, react, db, bt, pm) => {
                push_err(&mut errors, rails);
                push_err(&mut errors, react);
                push_err(&mut errors, db);
                push_err(&mut errors, bt);
                push_err(&mut errors, pm);
                Err(DomainError::collect(errors)
                    .err()
                    .unwrap_or_else(|| DomainError::ValidationFailed(Vec::new())))
            }
        }
    }

    /// Path of the Rails backend inside the project.
    pub fn backend_path(&self) -> PathBuf {
        self.project_path.join("backend")
    }

    /// Path of the React frontend inside the project.
    pub fn frontend_path(&self) -> PathBuf {
        self.project_path.join("frontend")
    }
}

/// Project names: non-empty, lowercase ASCII letters, digits, and hyphens.
pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
    let reason = if name.trim().is_empty() {
        Some("name cannot be empty")
    } else if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        Some("only lowercase letters, numbers, and hyphens are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DomainError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn push_err<T>(errors: &mut Vec<DomainError>, result: Result<T, DomainError>) {
    if let Err(e) = result {
        errors.push(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_options() {
        let cfg =
            ProjectConfig::resolve("shop", &GenerateOptions::default(), Path::new("/work")).unwrap();
        assert_eq!(cfg.project_path, PathBuf::from("/work/shop"));
        assert_eq!(cfg.rails_version.as_str(), "7.1.0");
        assert_eq!(cfg.react_version.as_str(), "18.2.0");
        assert_eq!(cfg.database, Database::Postgresql);
        assert_eq!(cfg.build_tool, BuildTool::Vite);
        assert_eq!(cfg.package_manager, PackageManager::Pnpm);
        assert!(cfg.features.docker && cfg.features.git);
    }

    #[test]
    fn resolve_collects_every_violation() {
        let opts = GenerateOptions {
            rails_version: Some("7.1".into()),
            database: Some("mysql".into()),
            package_manager: Some("bun".into()),
            ..Default::default()
        };
        match ProjectConfig::resolve("Bad Name", &opts, Path::new("/w")) {
            Err(DomainError::ValidationFailed(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("expected aggregate validation error, got {other:?}"),
        }
    }

    #[test]
    fn options_validate_only_supplied_values() {
        assert!(GenerateOptions::default().validate().is_ok());
        let opts = GenerateOptions {
            build_tool: Some("parcel".into()),
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(DomainError::InvalidField { field: "build tool", .. })
        ));
    }

    #[test]
    fn project_name_rules() {
        for ok in ["my-app", "shop2", "a"] {
            assert!(validate_project_name(ok).is_ok(), "{ok}");
        }
        for bad in ["", "  ", "My-App", "my_app", "my app", "../x"] {
            assert!(validate_project_name(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn component_paths_live_under_project() {
        let cfg =
            ProjectConfig::resolve("shop", &GenerateOptions::default(), Path::new("/w")).unwrap();
        assert_eq!(cfg.backend_path(), PathBuf::from("/w/shop/backend"));
        assert_eq!(cfg.frontend_path(), PathBuf::from("/w/shop/frontend"));
    }
}
