use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce the distribution README.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The README template does not parse, or references a missing variable.
    #[error("README template is invalid: {0}")]
    Template(#[from] tera::Error),

    #[error("README context could not be built: {0}")]
    Context(#[from] serde_json::Error),

    /// The configured replacement template could not be read.
    #[error("cannot read README template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
