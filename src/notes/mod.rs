//! Persistent notes document: merge new learnings into sections and reconcile.
use serde::Serialize;

use crate::lib::errors::{DocumentParseError, NotesError};

pub mod document;
pub mod reconcile;
pub mod store;

pub use document::{NotesDocument, Section, FALLBACK_SECTION, STANDARD_SECTIONS};
pub use reconcile::{normalize, reconcile_section, SubjectRule};
pub use store::{parse_entry_timestamp, CommitReceipt, NotesStore, Preview};

/// Keyword table for picking a section when the caller names none.
const SECTION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "User Preferences",
        &[
            "prefer",
            "prefers",
            "preferred",
            "preference",
            "preferences",
            "like",
            "likes",
            "dislike",
            "dislikes",
        ],
    ),
    (
        "Testing",
        &["test", "tests", "testing", "pytest", "fixture", "fixtures", "coverage"],
    ),
    (
        "Dependencies",
        &[
            "dependency",
            "dependencies",
            "package",
            "packages",
            "crate",
            "crates",
            "library",
            "libraries",
            "pin",
            "pinned",
            "install",
        ],
    ),
    (
        "Development Workflow",
        &[
            "git", "commit", "commits", "branch", "branches", "merge", "deploy", "release",
            "workflow", "ci", "pr",
        ],
    ),
    (
        "Project Structure",
        &[
            "directory",
            "directories",
            "folder",
            "file",
            "files",
            "module",
            "modules",
            "layout",
            "structure",
        ],
    ),
    (
        "Code Patterns",
        &[
            "pattern",
            "patterns",
            "style",
            "naming",
            "idiom",
            "convention",
            "conventions",
        ],
    ),
    (
        "Server Implementation",
        &["server", "transport", "endpoint", "http", "stdio", "port", "mcp"],
    ),
];

/// Pick a standard section for `content` by keyword.
pub fn classify(content: &str) -> &'static str {
    let words = normalize(content);
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| words.iter().any(|word| keywords.contains(&word.as_str())))
        .map(|(section, _)| *section)
        .unwrap_or(FALLBACK_SECTION)
}

/// Result of merging one entry into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Full document text after the merge.
    pub document: String,
    /// Title of the section the entry landed in.
    pub section: String,
    /// The entry line that was added.
    pub entry: String,
    /// Statements dropped as duplicates or contradictions.
    pub removed: Vec<String>,
    /// Set when the document could not be parsed and was appended to as-is.
    #[serde(skip)]
    pub recovered: Option<DocumentParseError>,
}

/// Merge `content` into `text` and reconcile the touched section.
///
/// `timestamp` is written into the entry as `[timestamp]`. An explicit
/// `section` is normalized like a parsed heading and must be a single line.
/// A document that
/// fails to parse is treated as one opaque block: the entry is appended in a
/// fresh section at the end and nothing else is changed.
pub fn merge_entry(
    text: &str,
    content: &str,
    section: Option<&str>,
    rule: &SubjectRule,
    timestamp: &str,
) -> Result<MergeOutcome, NotesError> {
    let statement = entry_text(content);
    if statement.is_empty() {
        return Err(NotesError::EmptyEntry);
    }
    let target = match section.filter(|s| !s.trim().is_empty()) {
        Some(section) => document::validate_title(section)
            .map_err(|reason| NotesError::InvalidSection {
                section: section.to_string(),
                reason,
            })?
            .to_string(),
        None => classify(&statement).to_string(),
    };
    let entry = format!("- [{timestamp}] {statement}");

    match NotesDocument::parse(text) {
        Ok(mut document) => {
            let section = document.ensure_section(&target);
            section.append_entry(&entry);
            let removed = reconcile_section(section, rule);
            let section = section.title().to_string();
            Ok(MergeOutcome {
                document: document.render(),
                section,
                entry,
                removed,
                recovered: None,
            })
        }
        Err(err) => {
            let mut document = text.to_string();
            let last_line = text.split_inclusive('\n').last();
            for line in document::section_separator(last_line) {
                document.push_str(&line);
            }
            document.push_str(&format!("## {target}\n{entry}\n"));
            Ok(MergeOutcome {
                document,
                section: target,
                entry,
                removed: Vec::new(),
                recovered: Some(err),
            })
        }
    }
}

/// Collapse free text into a single-line statement.
fn entry_text(content: &str) -> String {
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");
    flattened
        .strip_prefix("- ")
        .or_else(|| flattened.strip_prefix("* "))
        .unwrap_or(&flattened)
        .trim()
        .to_string()
}
