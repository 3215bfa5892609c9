//! Tera rendering engine for the distribution README.
//!
//! The built-in template is baked into the binary; a deployment may replace
//! it with its own file (see [`Renderer::with_override`]).

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::ReadmeContext;
use crate::error::RenderError;

/// File name of the generated README, relative to the distribution root.
pub const README_FILE: &str = "README.md";

const README_TEMPLATE: &str = "readme.md";
const README_SOURCE: &str = include_str!("templates/readme.md.tera");

fn read_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::TemplateRead {
        path: path.into(),
        source,
    }
}

fn build_tera(template: &str) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    // `.md` is not in tera's autoescape list, so the text passes through verbatim.
    tera.add_raw_template(README_TEMPLATE, template)?;
    Ok(tera)
}

/// Renders the README of the distribution repository.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Renderer using the built-in template.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Self {
            tera: build_tera(README_SOURCE)?,
        })
    }

    /// Renderer using the template at `path` when given, the built-in one otherwise.
    pub fn with_override(path: Option<&Path>) -> Result<Self, RenderError> {
        match path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|e| read_err(path, e))?;
                Ok(Self {
                    tera: build_tera(&source)?,
                })
            }
            None => Self::new(),
        }
    }

    pub fn render_readme(&self, ctx: &ReadmeContext) -> Result<String, RenderError> {
        let value = serde_json::to_value(ctx)?;
        let context = tera::Context::from_value(value)?;
        Ok(self.tera.render(README_TEMPLATE, &context)?)
    }
}
