use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Stdio,
};

use anyhow::{anyhow, Context, Result};
use rmcp::{
    model::{
        CallToolResult, ClientInfo, GetPromptResult, PromptMessageContent, ReadResourceResult,
        ResourceContents,
    },
    serve_client,
    service::{RunningService, ServiceError},
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

use productivity_mcp::server::{config::ServerConfig, runtime::build_server};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_productivity-mcp");

pub type Client = RunningService<RoleClient, ClientInfo>;

/// Write a stdio config next to `dir/AGENTS.md` and return its path.
pub fn write_stdio_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("productivity-mcp.toml");
    fs::write(
        &path,
        "[server]\ntransport = \"stdio\"\n\n[notes]\npath = \"AGENTS.md\"\n",
    )
    .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(path)
}

pub async fn spawn_server_process(
    config: &Path,
) -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .arg("--config")
        .arg(config)
        .env_remove("PRODUCTIVITY_MCP_CONFIG")
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().expect("child stdout");
    let stdin = child.stdin.take().expect("child stdin");
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

/// Server running on an in-memory duplex pipe, notes stored under `dir`.
pub struct InProcess {
    pub client: Client,
    server_task: JoinHandle<Result<()>>,
}

impl InProcess {
    pub async fn start(dir: &Path) -> Result<Self> {
        let config = ServerConfig::defaults_for(dir.join("productivity-mcp.toml"));
        let server = build_server(&config).map_err(|exit| anyhow!("{}", exit.message()))?;
        let (server_transport, client_transport) = tokio::io::duplex(4096);
        let server_task = tokio::spawn(async move {
            server.serve(server_transport).await?.waiting().await?;
            Result::<_, anyhow::Error>::Ok(())
        });
        let client = serve_client(ClientInfo::default(), client_transport).await?;
        Ok(Self {
            client,
            server_task,
        })
    }

    pub async fn shutdown(self) {
        let _ = self.client.cancel().await;
        let _ = self.server_task.await;
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

pub fn prompt_text(result: &GetPromptResult) -> String {
    match &result.messages[0].content {
        PromptMessageContent::Text { text } => text.clone(),
        other => panic!("unexpected prompt content: {other:?}"),
    }
}

pub fn tool_text(result: &CallToolResult) -> String {
    result.content[0]
        .as_text()
        .map(|text| text.text.clone())
        .expect("text content")
}

pub fn resource_text(result: &ReadResourceResult) -> String {
    match &result.contents[0] {
        ResourceContents::TextResourceContents { text, .. } => text.clone(),
        other => panic!("unexpected resource content: {other:?}"),
    }
}

/// Structured `data` payload of an MCP error response.
pub fn error_payload(error: ServiceError) -> Value {
    match error {
        ServiceError::McpError(inner) => inner.data.unwrap_or(Value::Null),
        other => panic!("unexpected error: {other:?}"),
    }
}

pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}
