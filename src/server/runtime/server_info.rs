use crate::{cli::TransportMode, server::config::ServerConfig};

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(config: &ServerConfig) -> String {
    let endpoint = match config.server.transport {
        TransportMode::Stdio => "stdio".to_string(),
        TransportMode::Http => format!("http on {} at /mcp", config.server.host),
    };
    format!(
        "Personal productivity server ({endpoint}). Prompts help plan, log progress, and stage git changes. \
         Use the `remember` prompt to preview a note for {notes}, then call `commit_memory` with the \
         returned expected_sha256 to save it. Read resource://notes for the current notes.",
        notes = config.notes.path.display(),
    )
}
