//! Prompt handlers: instructional text returned to the agent.
use std::{fmt::Write as _, path::Path, sync::Arc};

use chrono::Utc;

use crate::{
    lib::errors::{HandlerError, RegistryError},
    notes::{NotesStore, Preview, STANDARD_SECTIONS},
    registry::{Arguments, HandlerDescriptor, Invocation, ParamSpec, ParamType, Registry},
};

pub const TASK_PRIORITIZATION: &str = "task_prioritization";
pub const LOG_PROGRESS: &str = "log_progress";
pub const REMEMBER: &str = "remember";
pub const GIT_BRANCH_AND_STAGE: &str = "git_branch_and_stage";

const LOG_PROGRESS_TEXT: &str = "You are helping me create a comprehensive work log to capture all progress made during our current session. Follow these steps:

1. **Review our conversation**: Analyze everything we've accomplished, including:
   - Code changes and implementations
   - Problem-solving approaches taken
   - Decisions made and their rationale
   - Challenges encountered and how they were resolved
   - Key learnings and insights gained

2. **Create or update WORKLOG.md**:
   - Read the existing WORKLOG.md file (create it if it doesn't exist)
   - Add a new timestamped entry with today's date
   - Structure the entry with clear sections for easy future reference

3. **Document structure should include**:
   - **Date & Session Summary**: Brief overview of what was accomplished
   - **Code Changes**: Specific files modified, functions added/changed, architectural decisions
   - **Problem Solving**: Issues encountered, debugging steps, solutions implemented
   - **Key Learnings**: Important insights, patterns discovered, best practices identified
   - **Next Steps**: Clear action items and priorities for future sessions
   - **Context Notes**: Any important context that would help pick up where we left off

4. **Focus on actionable continuity**: Write entries that will help you (or another AI) quickly understand the current state and continue work effectively.

5. **Confirm completion**: Tell me what you documented and highlight the key points for future reference.

This work log serves as a bridge between sessions, ensuring no progress is lost and context is preserved for seamless continuation.";

const GIT_BRANCH_AND_STAGE_TEXT: &str = "You are helping the user create a new git branch and stage their changes. Follow these steps:

1. **Review the diff**: Examine the changes provided to understand what modifications were made.

2. **Confirm branch creation**: Ask the user which branch they want to create the new branch from. Default to creating from the current branch unless they specify otherwise.

3. **Generate branch name**: Based on the changes in the diff, suggest an appropriate branch name that clearly describes the work (e.g., 'add-login-feature', 'fix-api-timeout', 'refactor-database-layer').

4. **Create the branch**: Use `git checkout -b <branch-name>` to create and switch to the new branch.

5. **Stage all changes**: Run `git add .` or `git add -A` to stage all the changes.

6. **Confirm completion**: Let the user know the branch was created and changes were staged, but NOT committed yet.

Important: Do NOT commit the changes - only stage them. The user will commit when ready.";

/// Register every prompt handler.
pub fn register(registry: &mut Registry, store: Arc<NotesStore>) -> Result<(), RegistryError> {
    registry.add(
        HandlerDescriptor::prompt(
            TASK_PRIORITIZATION,
            "Help prioritize tasks by urgency, importance, energy levels, and dependencies.",
        )
        .param(ParamSpec::with_default(
            "task_list",
            ParamType::String,
            "your tasks",
            "Tasks to prioritize",
        )),
        task_prioritization,
    )?;

    registry.add(
        HandlerDescriptor::prompt(
            LOG_PROGRESS,
            "Document current progress and create a comprehensive work log for future reference.",
        ),
        |_| Ok(Invocation::Text(LOG_PROGRESS_TEXT.to_string())),
    )?;

    registry.add(
        HandlerDescriptor::prompt(
            REMEMBER,
            "Capture learnings into the notes document. With `content`, preview the reconciled document for confirmation.",
        )
        .param(ParamSpec::optional(
            "content",
            ParamType::String,
            "Statement to remember; omit for capture instructions",
        ))
        .param(ParamSpec::optional(
            "section",
            ParamType::String,
            "Target section; inferred from the content when omitted",
        )),
        move |args| remember(&store, args),
    )?;

    registry.add(
        HandlerDescriptor::prompt(
            GIT_BRANCH_AND_STAGE,
            "Create a new branch and stage all changes based on a diff.",
        ),
        |_| Ok(Invocation::Text(GIT_BRANCH_AND_STAGE_TEXT.to_string())),
    )?;

    Ok(())
}

fn task_prioritization(args: &Arguments) -> Result<Invocation, HandlerError> {
    let task_list = args.required_str("task_list")?;
    Ok(Invocation::Text(format!(
        "You are a productivity expert. Help me prioritize my tasks by considering:
1. Urgency (deadlines, time-sensitive)
2. Importance (impact on goals, values)
3. Energy levels required
4. Dependencies between tasks

Please analyze this task list: {task_list}
Provide a prioritized order with reasoning for each task."
    )))
}

fn remember(store: &NotesStore, args: &Arguments) -> Result<Invocation, HandlerError> {
    let file_name = display_name(store.path());
    match args.str("content").map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(Invocation::Text(capture_instructions(&file_name))),
        Some(content) => {
            let section = args.str("section");
            let preview = store.preview(content, section, Utc::now())?;
            Ok(Invocation::Text(confirmation_text(
                &file_name, content, section, &preview,
            )))
        }
    }
}

fn capture_instructions(file_name: &str) -> String {
    let mut sections = String::new();
    for section in STANDARD_SECTIONS {
        let _ = writeln!(sections, "   - **{section}**");
    }

    format!(
        "You are tasked with capturing important learnings and instructions from our conversation and adding them to {file_name}. Follow these steps:

1. **Review the conversation**: Look through our recent conversation for:
   - User preferences and workflow patterns
   - Important decisions or configurations
   - Code patterns or implementation details
   - Project structure insights
   - Testing approaches or dependencies

2. **Categorize the content** using these sections:
{sections}
3. **Preview the update**: For each learning, call this `remember` prompt again with `content` set to a single self-contained statement (and `section` when the category is clear). The server merges it into {file_name}, drops duplicates, and replaces older statements about the same subject.

4. **Confirm and commit**: Show the user the proposed document. Once they agree, call the `commit_memory` tool with the same arguments plus the `timestamp` and `expected_sha256` from the preview.

5. **Confirm what you remembered**: Tell me what you added to {file_name} and which section you placed it in.

Focus on capturing actionable insights that will help future AI agents understand the project context and user preferences."
    )
}

fn confirmation_text(
    file_name: &str,
    content: &str,
    section: Option<&str>,
    preview: &Preview,
) -> String {
    let outcome = &preview.outcome;
    let mut text = format!(
        "Proposed update to {file_name} (section: {}).\n\nAdded entry:\n{}\n\n",
        outcome.section, outcome.entry
    );

    if outcome.removed.is_empty() {
        text.push_str("Nothing was removed.\n\n");
    } else {
        text.push_str("Removed as duplicate or superseded:\n");
        for statement in &outcome.removed {
            let _ = writeln!(text, "- {statement}");
        }
        text.push('\n');
    }

    if let Some(err) = &outcome.recovered {
        let _ = writeln!(
            text,
            "Note: the existing document could not be parsed ({err}); the entry is appended in a new section without reconciliation.\n"
        );
    }

    let _ = write!(
        text,
        "Reconciled document:\n<document>\n{}</document>\n\n",
        outcome.document
    );

    let mut call = format!("`content` = {content:?}");
    if let Some(section) = section.map(str::trim).filter(|s| !s.is_empty()) {
        let _ = write!(call, ", `section` = {section:?}");
    }
    let _ = write!(
        text,
        "Show this to the user and ask them to confirm. Once confirmed, call the `commit_memory` tool with {call}, `timestamp` = \"{}\" and `expected_sha256` = \"{}\". Do not edit {file_name} directly.",
        preview.timestamp, preview.base_sha256
    );
    text
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
