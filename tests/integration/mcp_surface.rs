use anyhow::Result;
use rmcp::model::{
    CallToolRequestParam, ErrorCode, GetPromptRequestParam, ReadResourceRequestParam,
};
use serde_json::{json, Value};
use tempfile::tempdir;

use crate::common::{error_payload, object, prompt_text, resource_text, tool_text, InProcess};

#[tokio::test]
async fn prompts_render_with_string_arguments() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let result = server
        .client
        .get_prompt(GetPromptRequestParam {
            name: "task_prioritization".into(),
            arguments: Some(object(json!({ "task_list": "email, report, gym" }))),
        })
        .await?;
    assert!(prompt_text(&result).contains("Please analyze this task list: email, report, gym"));

    let result = server
        .client
        .get_prompt(GetPromptRequestParam {
            name: "git_branch_and_stage".into(),
            arguments: None,
        })
        .await?;
    assert!(prompt_text(&result).contains("Do NOT commit the changes"));

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn tools_validate_and_format_results() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let result = server
        .client
        .call_tool(CallToolRequestParam {
            name: "productivity_score".into(),
            arguments: Some(object(json!({
                "completed_tasks": 8,
                "planned_tasks": 10,
                "focus_time_minutes": 120
            }))),
        })
        .await?;
    assert_eq!(
        tool_text(&result),
        "Productivity Score: 60.0/100\nCompletion Rate: 80.0%\nFocus Time: 2.0 hours"
    );

    let result = server
        .client
        .call_tool(CallToolRequestParam {
            name: "time_block".into(),
            arguments: Some(object(json!({
                "start_time": "09:00",
                "duration_minutes": "45",
                "activity": "Deep work"
            }))),
        })
        .await?;
    assert_eq!(
        tool_text(&result),
        "Time block created: 09:00 for 45 minutes - Deep work"
    );

    let error = server
        .client
        .call_tool(CallToolRequestParam {
            name: "create_task".into(),
            arguments: Some(object(json!({ "priority": "high" }))),
        })
        .await
        .expect_err("missing task should fail");
    let payload = error_payload(error);
    assert_eq!(payload["code"], "INVALID_ARGUMENT");
    assert_eq!(payload["details"]["argument"], "task");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn unknown_names_are_rejected() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let error = server
        .client
        .call_tool(CallToolRequestParam {
            name: "does_not_exist".into(),
            arguments: None,
        })
        .await
        .expect_err("unknown tool should fail");
    match error {
        rmcp::service::ServiceError::McpError(data) => {
            assert_eq!(data.code, ErrorCode::INVALID_PARAMS);
            assert_eq!(
                data.data.as_ref().map(|d| d["code"].clone()),
                Some(Value::from("UNKNOWN_HANDLER"))
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let error = server
        .client
        .read_resource(ReadResourceRequestParam {
            uri: "resource://missing".into(),
        })
        .await
        .expect_err("unknown resource should fail");
    assert_eq!(error_payload(error)["code"], "UNKNOWN_RESOURCE");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn static_resources_are_pretty_json() -> Result<()> {
    let temp = tempdir().expect("can create temporary directory");
    let server = InProcess::start(temp.path()).await?;

    let result = server
        .client
        .read_resource(ReadResourceRequestParam {
            uri: "resource://focus_tips".into(),
        })
        .await?;
    let text = resource_text(&result);
    assert!(text.starts_with("{\n  \"tips\": ["), "text: {text}");
    let value: Value = serde_json::from_str(&text)?;
    assert!(value["tips"].is_array());

    server.shutdown().await;
    Ok(())
}
