//! Tool handlers: small computations plus the notes commit.
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    lib::errors::{HandlerError, RegistryError},
    notes::{parse_entry_timestamp, NotesStore},
    registry::{Arguments, HandlerDescriptor, Invocation, ParamSpec, ParamType, Registry},
};

pub const CREATE_TASK: &str = "create_task";
pub const TIME_BLOCK: &str = "time_block";
pub const PRODUCTIVITY_SCORE: &str = "productivity_score";
pub const COMMIT_MEMORY: &str = "commit_memory";

/// Register every tool handler.
pub fn register(registry: &mut Registry, store: Arc<NotesStore>) -> Result<(), RegistryError> {
    registry.add(
        HandlerDescriptor::tool(
            CREATE_TASK,
            "Creates a new task with specified priority and category.",
        )
        .param(ParamSpec::required("task", ParamType::String, "Task description"))
        .param(ParamSpec::with_default(
            "priority",
            ParamType::String,
            "medium",
            "Task priority",
        ))
        .param(ParamSpec::with_default(
            "category",
            ParamType::String,
            "general",
            "Task category",
        )),
        create_task,
    )?;

    registry.add(
        HandlerDescriptor::tool(
            TIME_BLOCK,
            "Creates a time block for focused work on a specific activity.",
        )
        .param(ParamSpec::required("start_time", ParamType::String, "Start time"))
        .param(ParamSpec::required(
            "duration_minutes",
            ParamType::Integer,
            "Length of the block in minutes",
        ))
        .param(ParamSpec::required("activity", ParamType::String, "What to work on")),
        time_block,
    )?;

    registry.add(
        HandlerDescriptor::tool(
            PRODUCTIVITY_SCORE,
            "Calculates a productivity score based on task completion and focus time.",
        )
        .param(ParamSpec::required(
            "completed_tasks",
            ParamType::Integer,
            "Tasks completed",
        ))
        .param(ParamSpec::required(
            "planned_tasks",
            ParamType::Integer,
            "Tasks planned",
        ))
        .param(ParamSpec::required(
            "focus_time_minutes",
            ParamType::Integer,
            "Minutes of focused work",
        )),
        productivity_score,
    )?;

    registry.add(
        HandlerDescriptor::tool(
            COMMIT_MEMORY,
            "Write a confirmed `remember` preview into the notes document.",
        )
        .param(ParamSpec::required(
            "content",
            ParamType::String,
            "Statement to remember",
        ))
        .param(ParamSpec::optional(
            "section",
            ParamType::String,
            "Target section; inferred from the content when omitted",
        ))
        .param(ParamSpec::optional(
            "expected_sha256",
            ParamType::String,
            "Digest from the preview; the write is refused if the document changed",
        ))
        .param(ParamSpec::optional(
            "timestamp",
            ParamType::String,
            "Entry timestamp from the preview (`YYYY-MM-DD HH:MM`, UTC); defaults to now",
        )),
        move |args| commit_memory(&store, args),
    )?;

    Ok(())
}

fn create_task(args: &Arguments) -> Result<Invocation, HandlerError> {
    let task = args.required_str("task")?;
    let priority = args.required_str("priority")?;
    let category = args.required_str("category")?;
    let task_id = format!("task_{}", 1000 + Uuid::new_v4().as_u128() % 9000);
    Ok(Invocation::Value(Value::String(format!(
        "Created task '{task}' with ID {task_id}, priority: {priority}, category: {category}"
    ))))
}

fn time_block(args: &Arguments) -> Result<Invocation, HandlerError> {
    let start_time = args.required_str("start_time")?;
    let duration = args.required_int("duration_minutes")?;
    let activity = args.required_str("activity")?;
    Ok(Invocation::Value(Value::String(format!(
        "Time block created: {start_time} for {duration} minutes - {activity}"
    ))))
}

/// Score = min(100, completion% * 0.7 + focus hours * 2).
pub fn score(completed_tasks: i64, planned_tasks: i64, focus_time_minutes: i64) -> (f64, f64, f64) {
    let completion_rate = if planned_tasks > 0 {
        completed_tasks as f64 / planned_tasks as f64 * 100.0
    } else {
        0.0
    };
    let focus_hours = focus_time_minutes as f64 / 60.0;
    let score = (completion_rate * 0.7 + focus_hours * 2.0).min(100.0);
    (score, completion_rate, focus_hours)
}

fn productivity_score(args: &Arguments) -> Result<Invocation, HandlerError> {
    let (score, completion_rate, focus_hours) = score(
        args.required_int("completed_tasks")?,
        args.required_int("planned_tasks")?,
        args.required_int("focus_time_minutes")?,
    );
    Ok(Invocation::Value(Value::String(format!(
        "Productivity Score: {score:.1}/100\nCompletion Rate: {completion_rate:.1}%\nFocus Time: {focus_hours:.1} hours"
    ))))
}

fn commit_memory(store: &NotesStore, args: &Arguments) -> Result<Invocation, HandlerError> {
    let stamped = match args.str("timestamp").filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => parse_entry_timestamp(raw)?,
        None => Utc::now(),
    };
    let receipt = store.commit(
        args.required_str("content")?,
        args.str("section"),
        args.str("expected_sha256"),
        stamped,
    )?;
    Ok(Invocation::Value(serde_json::to_value(receipt)?))
}
