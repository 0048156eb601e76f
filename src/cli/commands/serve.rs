use anyhow::Result;
use std::path::PathBuf;

use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, Secrets, resolve_config};
use crate::server;

pub struct ServeOptions {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub to: Option<String>,
}

/// Loads the config file and secrets and merges the CLI overrides.
///
/// Any failure here means the server must not start.
pub fn load_config(options: &ServeOptions) -> Result<ResolvedConfig> {
    let manager = match &options.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config_file = match &options.config {
        // An explicitly named file has to exist.
        Some(_) => manager.load()?,
        None => manager.load_or_default()?,
    };

    let secrets = Secrets::from_env()?;

    let resolve_options = ResolveOptions {
        host: options.host.clone(),
        port: options.port,
        model: options.model.clone(),
        to: options.to.clone(),
    };

    resolve_config(&resolve_options, &config_file, secrets)
}

pub async fn run_serve(config: ResolvedConfig) -> Result<()> {
    server::run_server(config).await
}
