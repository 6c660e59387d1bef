//! Load and validate server configuration.
use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{error, info};

use crate::{
    cli::{ConfigSource, LaunchProfile},
    lib::errors::ConfigError,
};

pub mod notes;
pub mod server;
pub mod telemetry;

pub use notes::{parse_notes_section, NotesSection, RawNotesSection, DEFAULT_NOTES_PATH};
pub use server::{
    parse_port_setting, parse_server_section, PortSetting, RawServerSection, ServerSection,
    DEFAULT_HOST,
};

/// Environment variable naming the config file.
pub const CONFIG_ENV_KEY: &str = "PRODUCTIVITY_MCP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "productivity-mcp.toml";

/// Top-level configuration container.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub notes: NotesSection,
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    server: Option<RawServerSection>,
    notes: Option<RawNotesSection>,
}

impl ServerConfig {
    /// Load the file named by the launch profile and apply its CLI overrides.
    ///
    /// Only the implicit default path may be absent.
    pub fn load_for_profile(profile: &LaunchProfile) -> Result<Self, ConfigError> {
        let path = profile.config_path.clone();
        telemetry::log_config_source(&path, profile.config_source);
        let config = match profile.config_source {
            ConfigSource::Default => Self::load_or_default(path)?,
            ConfigSource::Cli | ConfigSource::Env => Self::load_from_path(path)?,
        };
        Ok(config.with_overrides(profile))
    }

    /// Built-in defaults, as if `path` existed but was empty.
    pub fn defaults_for(path: PathBuf) -> Self {
        let base_dir = base_dir(&path);
        Self {
            server: ServerSection::default(),
            notes: NotesSection {
                path: base_dir.join(DEFAULT_NOTES_PATH),
                rule: Default::default(),
            },
            source_path: path,
        }
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load_from_path(path);
        }
        telemetry::log_defaults(&path);
        Ok(Self::defaults_for(path))
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "productivity_mcp::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder()
            .add_source(config::File::from(path.clone()).format(config::FileFormat::Toml));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "productivity_mcp::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "productivity_mcp::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "productivity_mcp::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    /// Apply CLI overrides from the launch profile.
    pub fn with_overrides(mut self, profile: &LaunchProfile) -> Self {
        if let Some(transport) = profile.transport {
            self.server.transport = transport;
        }
        if let Some(port) = profile.port {
            self.server.port = port;
        }
        if let Some(auto_reload) = profile.auto_reload {
            self.server.auto_reload = auto_reload;
        }
        self
    }

    fn from_raw(raw: RawServerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server, &path)?;
        let notes = parse_notes_section(raw.notes, &path, &base_dir(&path))?;

        Ok(Self {
            server,
            notes,
            source_path: path,
        })
    }
}

fn base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
