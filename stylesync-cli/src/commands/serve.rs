//! `stylesync serve`: run the webhook server in the foreground.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stylesync_core::config::{self, SECRET_ENV};
use stylesync_core::ServerConfig;

/// Arguments for `stylesync serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// YAML server settings (listen address, secret, sync settings).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding the config file.
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let mut server = match &self.config {
            Some(path) => config::load_server_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => ServerConfig::default(),
        };
        server = server.with_secret_override(std::env::var(SECRET_ENV).ok());
        if let Some(listen) = self.listen {
            server.listen = listen;
        }

        stylesync_daemon::start_blocking(server).context("webhook server exited with error")
    }
}
