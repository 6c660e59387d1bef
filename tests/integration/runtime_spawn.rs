use std::{process::Command as StdCommand, time::Duration};

use anyhow::Result;
use rmcp::{model::ClientInfo, serve_client};
use tempfile::tempdir;
use tokio::time::timeout;

use crate::common::{spawn_server_process, write_stdio_config, BINARY_PATH};

#[tokio::test]
async fn spawned_server_lists_every_handler_kind() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let config = write_stdio_config(temp.path())?;
    let (mut child, transport, stderr_task) = spawn_server_process(&config).await?;

    let client = serve_client(ClientInfo::default(), transport).await?;

    let prompts = client.list_prompts(None).await?;
    let prompt_names: Vec<_> = prompts.prompts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        prompt_names,
        [
            "task_prioritization",
            "log_progress",
            "remember",
            "git_branch_and_stage"
        ]
    );

    let tools = client.list_tools(None).await?;
    let tool_names: Vec<_> = tools.tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(
        tool_names,
        [
            "create_task",
            "time_block",
            "productivity_score",
            "commit_memory"
        ]
    );

    let resources = client.list_resources(None).await?;
    let uris: Vec<_> = resources.resources.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(
        uris,
        [
            "resource://productivity_methods",
            "resource://focus_tips",
            "resource://energy_management",
            "resource://notes"
        ]
    );

    client.cancel().await?;
    let status = timeout(Duration::from_secs(5), child.wait()).await??;
    assert!(
        status.success(),
        "server should exit cleanly but exit status was {status:?}"
    );
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }
    Ok(())
}

#[test]
fn hello_and_describe_print_project_info() {
    let hello = StdCommand::new(BINARY_PATH)
        .arg("hello")
        .output()
        .expect("process should start");
    assert!(hello.status.success());
    assert_eq!(
        String::from_utf8_lossy(&hello.stdout).trim(),
        "This project's name is productivity-mcp"
    );

    let describe = StdCommand::new(BINARY_PATH)
        .arg("describe")
        .output()
        .expect("process should start");
    assert!(describe.status.success());
    assert_eq!(
        String::from_utf8_lossy(&describe.stdout).trim(),
        "Personal productivity MCP server."
    );
}

#[test]
fn missing_explicit_config_fails_fast() {
    let temp = tempdir().expect("can create temporary directory");
    let output = StdCommand::new(BINARY_PATH)
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .env_remove("PRODUCTIVITY_MCP_CONFIG")
        .output()
        .expect("process should start");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to read configuration file"),
        "stderr: {stderr}"
    );
}
