//! CLI entrypoint module structure.
use anyhow::Result;

pub mod args;
pub mod profile;

pub use args::{CliCommand, LaunchProfileArgs, ParsedCommand};
pub use profile::{
    build_launch_args, resolve_config_path, ConfigSource, LaunchProfile, TransportMode,
};

pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");
pub const PROJECT_DESCRIPTION: &str = "Personal productivity MCP server.";
/// Server name reported to MCP clients.
pub const SERVER_NAME: &str = "personal-productivity-mcp";

/// Execute CLI command mode and return the text to print.
pub fn execute_cli_command(command: CliCommand) -> Result<String> {
    match command {
        CliCommand::Hello => Ok(format!("This project's name is {PROJECT_NAME}")),
        CliCommand::Describe => Ok(PROJECT_DESCRIPTION.to_string()),
    }
}
