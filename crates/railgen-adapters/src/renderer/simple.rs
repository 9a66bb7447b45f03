//! Simple variable substitution renderer.

use std::path::Path;

use railgen_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{
        Features, Permissions, ProjectStructure, RelativePath, RenderContext, TemplateContent,
        TemplateSet,
    },
    error::RailgenResult,
};
use tracing::{instrument, trace};

const KEEP_FILE: &str = ".keep";

/// Simple renderer using basic variable substitution.
///
/// File paths are rendered too, so `app/graphql/{{APP_NAME}}_schema.rb`
/// lands at the project-specific location.
pub struct SimpleRenderer;

impl SimpleRenderer {
    /// Create a new simple renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimpleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(component = %set.component))]
    fn render(
        &self,
        set: &TemplateSet,
        context: &RenderContext,
        features: &Features,
        output_root: &Path,
    ) -> RailgenResult<ProjectStructure> {
        let mut structure = ProjectStructure::new(output_root);

        for dir in &set.directories {
            structure.add_directory(dir.clone());
        }
        for dir in &set.keep_directories {
            let keep = RelativePath::try_new(dir.as_path().join(KEEP_FILE))?;
            structure.add_file(keep, String::new(), Permissions::Regular);
        }

        for file in set.files_for(features) {
            let path = render_path(file.path.as_str(), context)?;
            let content = render_content(&file.content, context);
            trace!(path = %path, "Rendered");
            structure.add_file(path, content, file.permissions);
        }

        Ok(structure)
    }
}

fn render_path(raw: &str, ctx: &RenderContext) -> RailgenResult<RelativePath> {
    let rendered = ctx.render(raw);
    if rendered.contains("{{") {
        return Err(ApplicationError::RenderingFailed {
            reason: format!("unresolved placeholder in path '{rendered}'"),
        }
        .into());
    }
    Ok(RelativePath::try_new(rendered)?)
}

fn render_content(content: &TemplateContent, ctx: &RenderContext) -> String {
    match content {
        TemplateContent::Literal(source) => (*source).to_string(),
        TemplateContent::Parameterized(source) => ctx.render(source),
    }
}
