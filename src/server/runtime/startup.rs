use std::{future::Future, process::ExitCode, sync::Arc};

use anyhow::{Context, Error};
use rmcp::{
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService,
    },
    ServiceExt,
};
use tokio::net::TcpListener;

use crate::{
    cli::{LaunchProfile, TransportMode},
    handlers::build_registry,
    lib::telemetry::{emit_runtime_mode, RuntimeModeTelemetry},
    notes::NotesStore,
    registry::HandlerKind,
    server::{
        config::ServerConfig,
        runtime::{build_instructions, ProductivityServer},
    },
};

/// Path the streamable HTTP service is mounted under.
pub const HTTP_MOUNT_PATH: &str = "/mcp";

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn report(self) -> ExitCode {
        eprintln!("{}", self.message);
        self.exit_code
    }
}

/// Build the notes store and registry described by `config`.
pub fn build_server(config: &ServerConfig) -> Result<ProductivityServer, RuntimeExit> {
    let store = Arc::new(NotesStore::new(
        config.notes.path.clone(),
        config.notes.rule,
        config.server.auto_reload,
    ));
    let registry = build_registry(store)
        .context("failed to register handlers")
        .map_err(RuntimeExit::from_error)?;
    Ok(ProductivityServer::new(registry, build_instructions(config)))
}

/// Start the MCP server and select stdio/HTTP based on the resolved config.
pub async fn run_server(profile: LaunchProfile, config: ServerConfig) -> Result<(), RuntimeExit> {
    let server = build_server(&config)?;
    let registry = server.registry();
    let http = config.server.transport == TransportMode::Http;

    emit_runtime_mode(&RuntimeModeTelemetry {
        transport: config.server.transport.as_str(),
        host: http.then_some(config.server.host.as_str()),
        port: http.then_some(config.server.port.bind_port()),
        config_path: config.source_path.to_string_lossy().as_ref(),
        notes_path: config.notes.path.to_string_lossy().as_ref(),
        auto_reload: config.server.auto_reload,
        prompts: registry.descriptors(HandlerKind::Prompt).count(),
        tools: registry.descriptors(HandlerKind::Tool).count(),
        resources: registry.descriptors(HandlerKind::Resource).count(),
        launch_args: &profile.launch_args,
    });

    match config.server.transport {
        TransportMode::Stdio => run_stdio(server).await,
        TransportMode::Http => run_http(server, &config).await,
    }
}

async fn run_stdio(server: ProductivityServer) -> Result<(), RuntimeExit> {
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(RuntimeExit::from_error)?;
    running.waiting().await.map_err(RuntimeExit::from_error)?;
    Ok(())
}

async fn run_http(server: ProductivityServer, config: &ServerConfig) -> Result<(), RuntimeExit> {
    let listener = bind_http(config).await?;
    serve_http(server, listener, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Bind the HTTP listener; port `random` binds port 0.
pub async fn bind_http(config: &ServerConfig) -> Result<TcpListener, RuntimeExit> {
    let addr = format!("{}:{}", config.server.host, config.server.port.bind_port());
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP address {addr}"))
        .map_err(RuntimeExit::from_error)
}

/// Serve streamable HTTP MCP on `listener` until `shutdown` resolves.
pub async fn serve_http(
    server: ProductivityServer,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), RuntimeExit> {
    let local_addr = listener
        .local_addr()
        .context("failed to read bound HTTP address")
        .map_err(RuntimeExit::from_error)?;
    tracing::info!(
        target: "productivity_mcp::runtime",
        transport = "http",
        bind_addr = %local_addr,
        path = HTTP_MOUNT_PATH,
        "Started listening in HTTP mode"
    );

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service(HTTP_MOUNT_PATH, service);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server stopped with an error")
        .map_err(RuntimeExit::from_error)?;
    tracing::info!(
        target: "productivity_mcp::runtime",
        transport = "http",
        "HTTP server shut down"
    );
    Ok(())
}
