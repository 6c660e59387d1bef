use std::fs;

use anyhow::{Context, Result};
use rmcp::model::{CallToolRequestParam, GetPromptRequestParam, ReadResourceRequestParam};
use serde_json::{json, Value};
use tempfile::tempdir;

use crate::common::{error_payload, object, prompt_text, resource_text, tool_text, InProcess};

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn quoted_argument<'a>(preview: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!("`{name}` = \"");
    let start = preview.find(&marker)? + marker.len();
    let end = preview[start..].find('"')? + start;
    Some(&preview[start..end])
}

fn expected_digest(preview: &str) -> Option<&str> {
    quoted_argument(preview, "expected_sha256")
}

fn previewed_document(preview: &str) -> Option<&str> {
    let start = preview.find("<document>\n")? + "<document>\n".len();
    let end = preview[start..].find("</document>")? + start;
    Some(&preview[start..end])
}

async fn remember(server: &InProcess, content: Option<&str>) -> Result<String> {
    let arguments = content.map(|content| object(json!({ "content": content })));
    let result = server
        .client
        .get_prompt(GetPromptRequestParam {
            name: "remember".into(),
            arguments,
        })
        .await?;
    Ok(prompt_text(&result))
}

async fn commit(server: &InProcess, args: Value) -> Result<Value> {
    let result = server
        .client
        .call_tool(CallToolRequestParam {
            name: "commit_memory".into(),
            arguments: Some(object(args)),
        })
        .await?;
    serde_json::from_str(&tool_text(&result)).context("receipt should be JSON")
}

async fn notes(server: &InProcess) -> Result<String> {
    let result = server
        .client
        .read_resource(ReadResourceRequestParam {
            uri: "resource://notes".into(),
        })
        .await?;
    Ok(resource_text(&result))
}

#[tokio::test]
async fn remember_without_content_returns_instructions() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let text = remember(&server, None).await?;
    assert!(text.contains("adding them to AGENTS.md"), "text: {text}");
    assert!(text.contains("commit_memory"), "text: {text}");
    assert!(!temp.path().join("AGENTS.md").exists());

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn preview_then_commit_then_supersede() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let preview = remember(&server, Some("Prefers dark mode")).await?;
    assert!(preview.contains("(section: User Preferences)"), "preview: {preview}");
    assert_eq!(expected_digest(&preview), Some(EMPTY_SHA256));
    assert!(
        !temp.path().join("AGENTS.md").exists(),
        "preview must not write the document"
    );

    let timestamp = quoted_argument(&preview, "timestamp").expect("timestamp");
    let receipt = commit(
        &server,
        json!({
            "content": "Prefers dark mode",
            "timestamp": timestamp,
            "expected_sha256": EMPTY_SHA256
        }),
    )
    .await?;
    assert_eq!(receipt["section"], "User Preferences");
    assert_eq!(receipt["recovered"], false);

    let text = notes(&server).await?;
    assert_eq!(Some(text.as_str()), previewed_document(&preview));
    assert!(text.starts_with("## User Preferences\n- ["), "notes: {text}");
    assert!(text.contains("] Prefers dark mode\n"), "notes: {text}");
    assert_eq!(fs::read_to_string(temp.path().join("AGENTS.md"))?, text);

    let receipt = commit(&server, json!({ "content": "Prefers light mode" })).await?;
    assert_eq!(receipt["removed"], json!(["Prefers dark mode"]));

    let text = notes(&server).await?;
    assert!(!text.contains("dark mode"), "notes: {text}");
    assert!(text.contains("] Prefers light mode\n"), "notes: {text}");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn stale_digest_is_refused_and_retryable() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let path = temp.path().join("AGENTS.md");
    fs::write(&path, "# Project notes\n\n## Testing\n- Uses cargo nextest\n")?;
    let server = InProcess::start(temp.path()).await?;

    let error = server
        .client
        .call_tool(CallToolRequestParam {
            name: "commit_memory".into(),
            arguments: Some(object(json!({
                "content": "Run tests with --all-features",
                "expected_sha256": EMPTY_SHA256
            }))),
        })
        .await
        .expect_err("stale digest should be refused");
    let payload = error_payload(error);
    assert_eq!(payload["code"], "NOTES_DOCUMENT_CHANGED");
    assert_eq!(payload["retryable"], true);
    assert_eq!(
        fs::read_to_string(&path)?,
        "# Project notes\n\n## Testing\n- Uses cargo nextest\n"
    );

    let preview = remember(&server, Some("Run tests with --all-features")).await?;
    let digest = expected_digest(&preview).expect("digest").to_string();
    let receipt = commit(
        &server,
        json!({ "content": "Run tests with --all-features", "expected_sha256": digest }),
    )
    .await?;
    assert_eq!(receipt["section"], "Testing");

    let text = fs::read_to_string(&path)?;
    assert!(text.starts_with("# Project notes\n\n## Testing\n- Uses cargo nextest\n- ["));

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn multi_line_section_is_an_invalid_argument() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let error = server
        .client
        .call_tool(CallToolRequestParam {
            name: "commit_memory".into(),
            arguments: Some(object(json!({
                "content": "Prefers dark mode",
                "section": "Dependencies\n## User Preferences"
            }))),
        })
        .await
        .expect_err("multi-line section should be refused");
    let payload = error_payload(error);
    assert_eq!(payload["code"], "INVALID_ARGUMENT");
    assert_eq!(payload["details"]["argument"], "section");
    assert!(!temp.path().join("AGENTS.md").exists());

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn empty_content_is_rejected() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let error = server
        .client
        .call_tool(CallToolRequestParam {
            name: "commit_memory".into(),
            arguments: Some(object(json!({ "content": "   " }))),
        })
        .await
        .expect_err("blank content should fail");
    assert_eq!(error_payload(error)["code"], "NOTES_EMPTY_ENTRY");

    server.shutdown().await;
    Ok(())
}
