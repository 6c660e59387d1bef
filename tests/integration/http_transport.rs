use std::time::Duration;

use anyhow::{anyhow, Result};
use rmcp::{
    model::{ClientInfo, ReadResourceRequestParam},
    serve_client,
    transport::StreamableHttpClientTransport,
};
use tempfile::tempdir;

use productivity_mcp::{
    cli::TransportMode,
    server::{
        config::{PortSetting, ServerConfig},
        runtime::{bind_http, build_server, serve_http, HTTP_MOUNT_PATH},
    },
};

use crate::common::resource_text;

#[tokio::test]
async fn http_transport_serves_listings_on_a_random_port() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let mut config = ServerConfig::defaults_for(temp.path().join("productivity-mcp.toml"));
    config.server.transport = TransportMode::Http;
    config.server.port = PortSetting::Random;

    let server = build_server(&config).map_err(|exit| anyhow!("{}", exit.message()))?;
    let listener = bind_http(&config)
        .await
        .map_err(|exit| anyhow!("{}", exit.message()))?;
    let addr = listener.local_addr()?;
    assert_ne!(addr.port(), 0, "random port should be resolved by the OS");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server_task = tokio::spawn(serve_http(server, listener, async {
        let _ = stop_rx.await;
    }));

    let transport =
        StreamableHttpClientTransport::from_uri(format!("http://{addr}{HTTP_MOUNT_PATH}"));
    let client = serve_client(ClientInfo::default(), transport).await?;

    let tools = client.list_tools(None).await?;
    let names: Vec<_> = tools.tools.iter().map(|tool| tool.name.as_ref()).collect();
    assert_eq!(
        names,
        ["create_task", "time_block", "productivity_score", "commit_memory"]
    );

    let notes = client
        .read_resource(ReadResourceRequestParam {
            uri: "resource://notes".into(),
        })
        .await?;
    assert_eq!(resource_text(&notes), "");

    let _ = client.cancel().await;
    let _ = stop_tx.send(());
    let _ = tokio::time::timeout(Duration::from_secs(5), server_task).await;
    Ok(())
}
