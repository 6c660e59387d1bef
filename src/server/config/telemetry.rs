use std::path::Path;

use tracing::{debug, info};

use super::{ServerConfig, CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};
use crate::cli::ConfigSource;

pub fn log_config_source(path: &Path, source: ConfigSource) {
    match source {
        ConfigSource::Cli => debug!(
            target: "productivity_mcp::config",
            path = %path.display(),
            "Loading configuration named by --config"
        ),
        ConfigSource::Env => info!(
            target: "productivity_mcp::config",
            path = %path.display(),
            "Loading configuration using PRODUCTIVITY_MCP_CONFIG environment variable"
        ),
        ConfigSource::Default => debug!(
            target: "productivity_mcp::config",
            path = %path.display(),
            env = CONFIG_ENV_KEY,
            default = DEFAULT_CONFIG_PATH,
            "PRODUCTIVITY_MCP_CONFIG not set; using default productivity-mcp.toml"
        ),
    }
}

pub fn log_defaults(path: &Path) {
    info!(
        target: "productivity_mcp::config",
        path = %path.display(),
        "No configuration file found; using built-in defaults"
    );
}

pub fn log_loaded(config: &ServerConfig) {
    info!(
        target: "productivity_mcp::config",
        path = %config.source_path.display(),
        transport = config.server.transport.as_str(),
        host = %config.server.host,
        port = config.server.port.bind_port(),
        auto_reload = config.server.auto_reload,
        notes_path = %config.notes.path.display(),
        leading_words = config.notes.rule.leading_words,
        trailing_words = config.notes.rule.trailing_words,
        "Configuration loaded successfully"
    );
}
