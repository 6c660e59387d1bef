//! LaunchProfile and config path resolution.
use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::server::config::{PortSetting, CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};

/// MCP transport mode.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http,
}

impl TransportMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Http => "http",
        }
    }

    /// Case-insensitive lookup used by the config file.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(TransportMode::Stdio),
            "http" => Some(TransportMode::Http),
            _ => None,
        }
    }
}

/// Where the config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    Env,
    Default,
}

/// Resolved launch profile. `None` fields defer to the config file.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub config_path: PathBuf,
    pub config_source: ConfigSource,
    pub transport: Option<TransportMode>,
    pub port: Option<PortSetting>,
    pub auto_reload: Option<bool>,
    pub launch_args: Vec<String>,
}

/// Resolve config path in the order: CLI override → env var → default.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> Result<(PathBuf, ConfigSource)> {
    let (path, source) = match override_path {
        Some(path) => (path, ConfigSource::Cli),
        None => match env::var_os(CONFIG_ENV_KEY).filter(|value| !value.is_empty()) {
            Some(value) => (PathBuf::from(value), ConfigSource::Env),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), ConfigSource::Default),
        },
    };

    if path.is_absolute() {
        return Ok((path, source));
    }

    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok((cwd.join(path), source))
}

/// Build launch arguments suitable for reproduction/logging.
pub fn build_launch_args(
    config: &Path,
    transport: Option<TransportMode>,
    port: Option<PortSetting>,
    auto_reload: Option<bool>,
) -> Vec<String> {
    let mut args = vec![format!("--config={}", config.display())];
    if let Some(transport) = transport {
        args.push(format!("--transport={}", transport.as_str()));
    }
    match port {
        Some(PortSetting::Random) => args.push("--port=random".to_string()),
        Some(PortSetting::Fixed(port)) => args.push(format!("--port={port}")),
        None => {}
    }
    match auto_reload {
        Some(true) => args.push("--reload".to_string()),
        Some(false) => args.push("--no-reload".to_string()),
        None => {}
    }
    args
}
