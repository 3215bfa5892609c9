//! Run configuration.
//!
//! Every component receives a [`SyncConfig`] by reference; nothing is kept in
//! process-wide state. Both structs deserialize from YAML with every field
//! optional, falling back to the values of the reference deployment:
//!
//! ```yaml
//! source_root: /srv/styles/original
//! distribution_root: /srv/styles/distribution
//! baseline_branch: master
//! lock_path: /tmp/csl-update.lock
//! min_styles: 6000
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BASELINE_BRANCH: &str = "master";
pub const DEFAULT_LOCK_PATH: &str = "/tmp/csl-update.lock";
pub const DEFAULT_MIN_STYLES: usize = 6000;
pub const DEFAULT_EXTENSION: &str = "csl";
pub const DEFAULT_DEPENDENT_DIR: &str = "dependent";
pub const DEFAULT_UPSTREAM_URL: &str = "https://github.com/citation-style-language/styles";
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Environment variable holding the webhook shared secret. Wins over the file.
pub const SECRET_ENV: &str = "STYLESYNC_AUTHORIZATION";

/// Settings for one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Checkout of the upstream style repository.
    pub source_root: PathBuf,
    /// Checkout of the distribution repository that gets committed and pushed.
    pub distribution_root: PathBuf,
    pub baseline_branch: String,
    pub lock_path: PathBuf,
    /// Floor for tracked styles in the distribution repository.
    pub min_styles: usize,
    /// Extension of managed files, without the dot.
    pub extension: String,
    /// The one subdirectory of the source root that is mirrored.
    pub dependent_dir: String,
    /// Upstream web URL, used for the README and the commit message.
    pub upstream_url: String,
    /// Tera template replacing the built-in README text.
    pub readme_template: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            distribution_root: PathBuf::new(),
            baseline_branch: DEFAULT_BASELINE_BRANCH.to_owned(),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
            min_styles: DEFAULT_MIN_STYLES,
            extension: DEFAULT_EXTENSION.to_owned(),
            dependent_dir: DEFAULT_DEPENDENT_DIR.to_owned(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_owned(),
            readme_template: None,
        }
    }
}

impl SyncConfig {
    pub fn new(source_root: impl Into<PathBuf>, distribution_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            distribution_root: distribution_root.into(),
            ..Self::default()
        }
    }

    /// Reject configurations that cannot possibly run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_root.as_os_str().is_empty() {
            return Err(ConfigError::Missing("source_root"));
        }
        if self.distribution_root.as_os_str().is_empty() {
            return Err(ConfigError::Missing("distribution_root"));
        }
        if self.baseline_branch.trim().is_empty() {
            return Err(ConfigError::Missing("baseline_branch"));
        }
        if self.extension.trim().is_empty() {
            return Err(ConfigError::Missing("extension"));
        }
        Ok(())
    }

    /// True when `path` names a managed file (by extension only).
    pub fn is_style_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == self.extension)
            .unwrap_or(false)
    }

    /// True when a `git ls-files` entry names a managed file.
    pub fn is_style_name(&self, name: &str) -> bool {
        name.strip_suffix(self.extension.as_str())
            .map(|stem| stem.ends_with('.'))
            .unwrap_or(false)
    }
}

/// Settings for the webhook server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Expected value of the `Authorization` header. `None` rejects every request.
    pub secret: Option<String>,
    pub sync: SyncConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_LISTEN_PORT)),
            secret: None,
            sync: SyncConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Apply the value of [`SECRET_ENV`], if it was set and non-empty.
    pub fn with_secret_override(mut self, env_value: Option<String>) -> Self {
        if let Some(secret) = env_value.filter(|s| !s.is_empty()) {
            self.secret = Some(secret);
        }
        self
    }
}

/// Load a YAML config file into `T`.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_sync_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    load_yaml(path)
}

pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    load_yaml(path)
}
