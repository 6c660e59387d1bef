//! Telemetry initialization and handler dispatch span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};

use crate::registry::HandlerKind;

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr so the stdio transport keeps stdout for protocol frames.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper recording one handler invocation.
pub struct DispatchSpan {
    span: Span,
    started_at: Instant,
    kind: HandlerKind,
}

impl DispatchSpan {
    pub fn start(kind: HandlerKind, name: &str) -> Self {
        let span = info_span!(
            target: "productivity_mcp::registry",
            "dispatch",
            kind = kind.as_str(),
            handler = name
        );
        Self {
            span,
            started_at: Instant::now(),
            kind,
        }
    }

    /// Close the span while recording the outcome.
    pub fn finish(self, status: &'static str) {
        let elapsed_us = self.started_at.elapsed().as_micros();
        let _entered = self.span.enter();
        debug!(
            target: "productivity_mcp::registry",
            kind = self.kind.as_str(),
            status = status,
            elapsed_us = elapsed_us,
            "Dispatched handler"
        );
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub config_path: &'a str,
    pub notes_path: &'a str,
    pub auto_reload: bool,
    pub prompts: usize,
    pub tools: usize,
    pub resources: usize,
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    tracing::info!(
        target: "productivity_mcp::runtime",
        transport = telemetry.transport,
        host = telemetry.host.unwrap_or(""),
        port = telemetry.port.unwrap_or_default(),
        config_path = telemetry.config_path,
        notes_path = telemetry.notes_path,
        auto_reload = telemetry.auto_reload,
        prompts = telemetry.prompts,
        tools = telemetry.tools,
        resources = telemetry.resources,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
