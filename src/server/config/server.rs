use std::path::Path;

use serde::Deserialize;

use crate::{cli::TransportMode, lib::errors::ConfigError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const RANDOM_PORT: &str = "random";

/// Port to listen on in HTTP mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortSetting {
    /// Let the OS pick a free port.
    #[default]
    Random,
    Fixed(u16),
}

impl PortSetting {
    /// Port number handed to `bind` (0 asks the OS for a free port).
    pub const fn bind_port(&self) -> u16 {
        match self {
            PortSetting::Random => 0,
            PortSetting::Fixed(port) => *port,
        }
    }
}

/// Parse `random` or a port number in 1024-65535.
pub fn parse_port_setting(raw: &str) -> Result<PortSetting, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(RANDOM_PORT) {
        return Ok(PortSetting::Random);
    }
    let port: u16 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is neither `random` nor a port number"))?;
    if (1024..=65535).contains(&port) {
        Ok(PortSetting::Fixed(port))
    } else {
        Err("Use a port in the range 1024-65535".into())
    }
}

/// Server transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSection {
    pub transport: TransportMode,
    pub host: String,
    pub port: PortSetting,
    pub auto_reload: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            host: DEFAULT_HOST.to_string(),
            port: PortSetting::Random,
            auto_reload: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawServerSection {
    pub transport: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub auto_reload: Option<bool>,
}

pub fn parse_server_section(
    raw: Option<RawServerSection>,
    path: &Path,
) -> Result<ServerSection, ConfigError> {
    let server_raw = raw.unwrap_or_default();
    let defaults = ServerSection::default();

    let transport = match server_raw.transport {
        Some(value) => TransportMode::parse(&value).ok_or_else(|| ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "server.transport",
            message: format!("`{value}` is not one of stdio, http"),
        })?,
        None => defaults.transport,
    };
    let host = match server_raw.host {
        Some(host) if host.trim().is_empty() => {
            return Err(ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "server.host",
                message: "host must not be empty".into(),
            })
        }
        Some(host) => host.trim().to_string(),
        None => defaults.host,
    };
    let port = match server_raw.port {
        Some(value) => parse_port_setting(&value).map_err(|message| ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "server.port",
            message,
        })?,
        None => defaults.port,
    };

    Ok(ServerSection {
        transport,
        host,
        port,
        auto_reload: server_raw.auto_reload.unwrap_or(defaults.auto_reload),
    })
}
