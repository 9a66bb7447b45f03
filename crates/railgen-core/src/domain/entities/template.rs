//! Template domain model.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TemplateSet (one per generator component)                  │
//! │  ├── Component: backend | frontend | graphql | docker | git │
//! │  ├── base: directory under the project root                 │
//! │  ├── directories: always-created, may carry a .keep file    │
//! │  └── files: TemplateFile                                    │
//! │        ├── path (may contain {{PLACEHOLDERS}})              │
//! │        ├── content: Literal | Parameterized                 │
//! │        └── condition: feature gate                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RenderContext (Value Object)                               │
//! │  └── Variable substitution: {{APP_NAME}} -> "MyApp"         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Substitution is the only templating feature. Conditional blocks are
//! expressed by pre-computed snippet variables (`AUTHENTICATION_GEMS`, ...)
//! that are empty when the feature is off.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::{
    entities::{
        common::{Permissions, RelativePath},
        config::{Features, ProjectConfig, RUBY_VERSION},
    },
    error::DomainError,
};

/// Generator component a template set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Backend,
    Frontend,
    Graphql,
    Docker,
    Git,
}

impl Component {
    pub const ALL: [Self; 5] = [
        Self::Backend,
        Self::Frontend,
        Self::Graphql,
        Self::Docker,
        Self::Git,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Frontend => "frontend",
            Self::Graphql => "graphql",
            Self::Docker => "docker",
            Self::Git => "git",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single feature toggle, used to gate template files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Typescript,
    Testing,
    Linting,
    Authentication,
    ApiDocumentation,
    Git,
    Docker,
}

impl Features {
    pub const fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Typescript => self.typescript,
            Feature::Testing => self.testing,
            Feature::Linting => self.linting,
            Feature::Authentication => self.authentication,
            Feature::ApiDocumentation => self.api_documentation,
            Feature::Git => self.git,
            Feature::Docker => self.docker,
        }
    }
}

/// When a template file is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Condition {
    #[default]
    Always,
    When(Feature),
    Unless(Feature),
}

impl Condition {
    pub const fn holds(&self, features: &Features) -> bool {
        match self {
            Self::Always => true,
            Self::When(f) => features.is_enabled(*f),
            Self::Unless(f) => !features.is_enabled(*f),
        }
    }
}

/// Template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateContent {
    /// Copied verbatim.
    Literal(&'static str),
    /// Rendered through [`RenderContext::render`].
    Parameterized(&'static str),
}

impl TemplateContent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal(s) | Self::Parameterized(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: RelativePath,
    pub content: TemplateContent,
    pub condition: Condition,
    pub permissions: Permissions,
}

impl TemplateFile {
    pub fn new(path: &str, content: TemplateContent) -> Self {
        Self {
            path: RelativePath::new(path),
            content,
            condition: Condition::Always,
            permissions: Permissions::Regular,
        }
    }

    pub fn when(mut self, feature: Feature) -> Self {
        self.condition = Condition::When(feature);
        self
    }

    pub fn unless(mut self, feature: Feature) -> Self {
        self.condition = Condition::Unless(feature);
        self
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::Executable;
        self
    }
}

/// The files one generator component lays down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub component: Component,
    /// Directory under the project root the set is rendered into.
    pub base: Option<RelativePath>,
    /// Directories created even when no file lands in them.
    pub directories: Vec<RelativePath>,
    /// Subset of `directories` that receive an empty `.keep` file.
    pub keep_directories: Vec<RelativePath>,
    pub files: Vec<TemplateFile>,
}

impl TemplateSet {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            base: None,
            directories: Vec::new(),
            keep_directories: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(RelativePath::new(base));
        self
    }

    pub fn with_directories(mut self, dirs: &[&str]) -> Self {
        self.directories.extend(dirs.iter().map(|d| RelativePath::new(*d)));
        self
    }

    pub fn with_keep_directories(mut self, dirs: &[&str]) -> Self {
        self.keep_directories
            .extend(dirs.iter().map(|d| RelativePath::new(*d)));
        self
    }

    pub fn with_file(mut self, file: TemplateFile) -> Self {
        self.files.push(file);
        self
    }

    /// Files that apply under the given feature toggles.
    pub fn files_for<'a>(&'a self, features: &'a Features) -> impl Iterator<Item = &'a TemplateFile> {
        self.files.iter().filter(move |f| f.condition.holds(features))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.files.is_empty() {
            return Err(DomainError::EmptyTemplate {
                component: self.component.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            // Two files may share a path only if their conditions differ
            // (e.g. main.tsx vs main.jsx variants of the same slot).
            if !seen.insert((file.path.as_str().to_string(), file.condition)) {
                return Err(DomainError::DuplicatePath {
                    path: file.path.to_string(),
                });
            }
        }

        for keep in &self.keep_directories {
            if !self.directories.contains(keep) {
                return Err(DomainError::InvalidTemplate(format!(
                    "keep directory '{keep}' is not declared in '{}'",
                    self.component
                )));
            }
        }

        Ok(())
    }
}

/// Context for template rendering.
///
/// A **Value Object** containing all data needed to render a parameterized
/// template. Immutable after creation; `with_variable` returns a new value.
///
/// ## Built-in Variables
///
/// | Variable | Example |
/// |----------|---------|
/// | `PROJECT_NAME` | "my-shop" |
/// | `PROJECT_NAME_SNAKE` | "my_shop" |
/// | `APP_NAME` | "MyShop" |
/// | `RAILS_VERSION` / `REACT_VERSION` | "7.1.0" / "18.2.0" |
/// | `RUBY_VERSION` | "3.2.2" |
/// | `DATABASE_ADAPTER` | "postgresql" or "sqlite3" |
/// | `AUTHENTICATION_GEMS` etc. | snippet, empty when disabled |
#[derive(Debug, Clone)]
pub struct RenderContext {
    project_name: String,
    variables: HashMap<String, String>,
}

impl RenderContext {
    /// A context carrying only the project-name derived variables.
    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        let mut vars = HashMap::new();
        vars.insert("PROJECT_NAME".to_string(), name.clone());
        vars.insert("PROJECT_NAME_SNAKE".to_string(), to_snake_case(&name));
        vars.insert("APP_NAME".to_string(), to_pascal_case(&name));
        Self {
            project_name: name,
            variables: vars,
        }
    }

    /// The full variable set for a project.
    pub fn for_project(config: &ProjectConfig) -> Self {
        let f = &config.features;
        let snippet = |on: bool, text: &str| if on { text.to_string() } else { String::new() };

        Self::new(&config.project_name)
            .with_variable("RAILS_VERSION", config.rails_version.as_str())
            .with_variable("REACT_VERSION", config.react_version.as_str())
            .with_variable("RUBY_VERSION", RUBY_VERSION)
            .with_variable("DATABASE", config.database.as_str())
            .with_variable("DATABASE_ADAPTER", config.database.adapter())
            .with_variable("BUILD_TOOL", config.build_tool.as_str())
            .with_variable("FRONTEND_PORT", config.build_tool.dev_port().to_string())
            .with_variable("BUILD_TOOL_DEV", config.build_tool.scripts().0)
            .with_variable("BUILD_TOOL_BUILD", config.build_tool.scripts().1)
            .with_variable("BUILD_TOOL_DEPENDENCIES", config.build_tool.dev_dependencies())
            .with_variable("BUILD_TOOL_CONFIG", config.build_tool.config_file())
            .with_variable("SCRIPT_EXT", if f.typescript { "ts" } else { "js" })
            .with_variable("JSX_EXT", if f.typescript { "tsx" } else { "jsx" })
            .with_variable(
                "TYPESCRIPT_DEPENDENCIES",
                snippet(
                    f.typescript,
                    "\"typescript\": \"^5.3.0\",\n    \"@types/react\": \"^18.2.0\",\n    \"@types/react-dom\": \"^18.2.0\",",
                ),
            )
            .with_variable(
                "TESTING_DEPENDENCIES",
                snippet(
                    f.testing,
                    "\"vitest\": \"^1.0.0\",\n    \"jsdom\": \"^23.0.0\",\n    \"@testing-library/react\": \"^14.1.0\",",
                ),
            )
            .with_variable(
                "LINTING_DEPENDENCIES",
                snippet(
                    f.linting,
                    "\"eslint\": \"^8.55.0\",\n    \"eslint-plugin-react\": \"^7.33.0\",\n    \"eslint-plugin-react-hooks\": \"^4.6.0\",\n    \"prettier\": \"^3.1.0\",",
                ),
            )
            .with_variable("PACKAGE_MANAGER", config.package_manager.as_str())
            .with_variable("PACKAGE_MANAGER_RUN", config.package_manager.run_prefix())
            .with_variable("AUTHENTICATION", f.authentication.to_string())
            .with_variable("API_DOCUMENTATION", f.api_documentation.to_string())
            .with_variable("LINTING", f.linting.to_string())
            .with_variable("TYPE_CHECKING", "true")
            .with_variable(
                "AUTHENTICATION_GEMS",
                snippet(f.authentication, "gem \"bcrypt\", \"~> 3.1.7\"\ngem \"jwt\", \"~> 2.2\""),
            )
            .with_variable(
                "API_DOCS_GEMS",
                snippet(f.api_documentation, "gem \"rswag-api\"\ngem \"rswag-ui\""),
            )
            .with_variable(
                "LINTING_GEMS",
                snippet(
                    f.linting,
                    "gem \"rubocop\", require: false\ngem \"rubocop-rails\", require: false\ngem \"rubocop-rspec\", require: false",
                ),
            )
            .with_variable(
                "TYPE_CHECKING_GEMS",
                "gem \"sorbet\", group: :development\ngem \"sorbet-rails\", group: :development\ngem \"tapioca\", require: false, group: :development",
            )
            .with_variable(
                "API_DOCS_ROUTES",
                snippet(
                    f.api_documentation,
                    "# API Documentation\n  mount Rswag::Ui::Engine => '/api-docs'\n  mount Rswag::Api::Engine => '/api-docs'",
                ),
            )
            .with_variable(
                "API_DOCS_ENDPOINT",
                snippet(f.api_documentation, "docs: \"/api-docs\","),
            )
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    /// Replace `{{VARIABLE}}` placeholders.
    ///
    /// - `{{UNKNOWN}}` remains as the literal `{{UNKNOWN}}`
    /// - repeated placeholders are all replaced
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }
}

fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `my-app` → `MyApp`, used for Ruby constant names.
fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

fn split_words(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::config::GenerateOptions;
    use std::path::Path;

    fn config(features: Features) -> ProjectConfig {
        let opts = GenerateOptions {
            database: Some("sqlite".into()),
            features,
            ..Default::default()
        };
        ProjectConfig::resolve("my-shop", &opts, Path::new("/w")).unwrap()
    }

    #[test]
    fn app_name_is_pascal_case() {
        let ctx = RenderContext::new("my-shop-2");
        assert_eq!(ctx.get("APP_NAME"), Some("MyShop2"));
        assert_eq!(ctx.get("PROJECT_NAME_SNAKE"), Some("my_shop_2"));
    }

    #[test]
    fn render_replaces_known_and_keeps_unknown() {
        let ctx = RenderContext::new("shop");
        assert_eq!(
            ctx.render("module {{APP_NAME}} # {{APP_NAME}} {{NOPE}}"),
            "module Shop # Shop {{NOPE}}"
        );
    }

    #[test]
    fn project_context_maps_database_adapter() {
        let ctx = RenderContext::for_project(&config(Features::default()));
        assert_eq!(ctx.render("adapter: {{DATABASE_ADAPTER}}"), "adapter: sqlite3");
        assert_eq!(ctx.get("RUBY_VERSION"), Some("3.2.2"));
    }

    #[test]
    fn disabled_features_blank_their_snippets() {
        let features = Features {
            authentication: false,
            api_documentation: false,
            ..Features::default()
        };
        let ctx = RenderContext::for_project(&config(features));
        assert_eq!(ctx.get("AUTHENTICATION_GEMS"), Some(""));
        assert_eq!(ctx.get("API_DOCS_ROUTES"), Some(""));
        assert!(ctx.get("LINTING_GEMS").is_some_and(|s| s.contains("rubocop")));
    }

    #[test]
    fn javascript_projects_use_js_extensions_and_skip_ts_deps() {
        let features = Features {
            typescript: false,
            ..Features::default()
        };
        let ctx = RenderContext::for_project(&config(features));
        assert_eq!(ctx.render("src/App.test.{{JSX_EXT}}"), "src/App.test.jsx");
        assert_eq!(ctx.get("TYPESCRIPT_DEPENDENCIES"), Some(""));
        assert_eq!(ctx.render("{{BUILD_TOOL}}.config.js"), "vite.config.js");
    }

    #[test]
    fn conditions_follow_features() {
        let off = Features {
            typescript: false,
            ..Features::default()
        };
        assert!(Condition::When(Feature::Typescript).holds(&Features::default()));
        assert!(!Condition::When(Feature::Typescript).holds(&off));
        assert!(Condition::Unless(Feature::Typescript).holds(&off));
        assert!(Condition::Always.holds(&off));
    }

    #[test]
    fn empty_set_is_invalid() {
        assert!(matches!(
            TemplateSet::new(Component::Git).validate(),
            Err(DomainError::EmptyTemplate { .. })
        ));
    }

    #[test]
    fn same_path_allowed_only_with_distinct_conditions() {
        let ok = TemplateSet::new(Component::Frontend)
            .with_file(TemplateFile::new("src/main", TemplateContent::Literal("a")).when(Feature::Typescript))
            .with_file(TemplateFile::new("src/main", TemplateContent::Literal("b")).unless(Feature::Typescript));
        assert!(ok.validate().is_ok());

        let dup = TemplateSet::new(Component::Frontend)
            .with_file(TemplateFile::new("x", TemplateContent::Literal("a")))
            .with_file(TemplateFile::new("x", TemplateContent::Literal("b")));
        assert!(matches!(dup.validate(), Err(DomainError::DuplicatePath { .. })));
    }

    #[test]
    fn same_path_and_same_feature_condition_is_a_duplicate() {
        let set = TemplateSet::new(Component::Frontend)
            .with_file(TemplateFile::new("tsconfig.json", TemplateContent::Literal("a")).when(Feature::Typescript))
            .with_file(TemplateFile::new("tsconfig.json", TemplateContent::Literal("b")).when(Feature::Typescript));
        assert!(matches!(set.validate(), Err(DomainError::DuplicatePath { path }) if path == "tsconfig.json"));

        let conditions: HashSet<Condition> = [
            Condition::Always,
            Condition::When(Feature::Typescript),
            Condition::When(Feature::Typescript),
            Condition::Unless(Feature::Typescript),
        ]
        .into_iter()
        .collect();
        assert_eq!(conditions.len(), 3);
    }

    #[test]
    fn keep_directories_must_be_declared() {
        let set = TemplateSet::new(Component::Backend)
            .with_keep_directories(&["log"])
            .with_file(TemplateFile::new("Gemfile", TemplateContent::Literal("")));
        assert!(matches!(set.validate(), Err(DomainError::InvalidTemplate(_))));
    }
}
