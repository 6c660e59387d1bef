//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};
use crate::server::config::{parse_port_setting, PortSetting};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunServer(LaunchProfile),
    Cli(CliCommand),
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Print the project name.
    Hello,
    /// Print a one-line description of the server.
    Describe,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "productivity-mcp",
    author,
    version,
    about = "Personal productivity MCP server",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Path to productivity-mcp.toml (overrides PRODUCTIVITY_MCP_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Select stdio or http (overrides `server.transport`).
    #[arg(long, value_enum)]
    pub transport: Option<TransportMode>,
    /// HTTP port, or `random` (overrides `server.port`).
    #[arg(long, value_parser = parse_port_setting)]
    pub port: Option<PortSetting>,
    /// Re-read the notes document on every request.
    #[arg(long, overrides_with = "no_reload")]
    pub reload: bool,
    /// Cache the notes document after the first read.
    #[arg(long, overrides_with = "reload")]
    pub no_reload: bool,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchProfile> {
        let (config_path, config_source) = resolve_config_path(self.config_override)?;
        let auto_reload = match (self.reload, self.no_reload) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        let launch_args = build_launch_args(&config_path, self.transport, self.port, auto_reload);

        Ok(LaunchProfile {
            config_path,
            config_source,
            transport: self.transport,
            port: self.port,
            auto_reload,
            launch_args,
        })
    }

    /// Parse CLI args into either server launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        match self.command {
            Some(command) => Ok(ParsedCommand::Cli(command)),
            None => Ok(ParsedCommand::RunServer(self.build()?)),
        }
    }
}
