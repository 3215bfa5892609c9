//! Data handed to the README template.

use serde::Serialize;

/// Heading of the generated README.
pub const README_TITLE: &str = "CSL Styles Distribution";

/// Template variables for `README.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadmeContext {
    pub title: String,
    /// Setext underline matching the title width.
    pub underline: String,
    /// `owner/repo` label for the upstream link.
    pub upstream_name: String,
    pub upstream_url: String,
}

impl ReadmeContext {
    /// Build the context for a distribution mirroring `upstream_url`.
    pub fn from_upstream(upstream_url: &str) -> Self {
        let upstream_url = upstream_url.trim_end_matches('/').to_string();
        Self {
            title: README_TITLE.to_string(),
            underline: "=".repeat(README_TITLE.len()),
            upstream_name: upstream_name(&upstream_url),
            upstream_url,
        }
    }
}

/// Last two path segments of a repository URL (`owner/repo`), or the URL itself.
fn upstream_name(url: &str) -> String {
    let path = url.split("://").nth(1).unwrap_or(url);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [_host, .., owner, repo] => format!("{owner}/{}", repo.trim_end_matches(".git")),
        _ => url.to_string(),
    }
}
