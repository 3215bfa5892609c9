//! Domain types shared across the stylesync crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic name of the current head revision.
pub const HEAD: &str = "HEAD";

/// A revision of the source repository to mirror (commit hash, branch, or `HEAD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(pub String);

impl Revision {
    /// The current head of the baseline branch.
    pub fn head() -> Self {
        Self(HEAD.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_head(&self) -> bool {
        self.0 == HEAD
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::head()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Revision {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Revision {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
