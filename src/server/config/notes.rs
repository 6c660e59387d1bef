use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    lib::{errors::ConfigError, paths::resolve_against},
    notes::SubjectRule,
};

pub const DEFAULT_NOTES_PATH: &str = "AGENTS.md";
/// Upper bound for either subject-key word count.
pub const MAX_SUBJECT_WORDS: usize = 8;

/// Notes document settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesSection {
    pub path: PathBuf,
    pub rule: SubjectRule,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawNotesSection {
    pub path: Option<String>,
    pub leading_words: Option<i64>,
    pub trailing_words: Option<i64>,
}

/// Relative `path` values resolve against `base_dir` (the config file's directory).
pub fn parse_notes_section(
    raw: Option<RawNotesSection>,
    path: &Path,
    base_dir: &Path,
) -> Result<NotesSection, ConfigError> {
    let raw = raw.unwrap_or_default();
    let defaults = SubjectRule::default();

    let notes_path = match raw.path {
        Some(value) if value.trim().is_empty() => {
            return Err(ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "notes.path",
                message: "path must not be empty".into(),
            })
        }
        Some(value) => PathBuf::from(value.trim()),
        None => PathBuf::from(DEFAULT_NOTES_PATH),
    };

    let leading_words = word_count(
        raw.leading_words,
        defaults.leading_words,
        "notes.leading_words",
        path,
    )?;
    let trailing_words = word_count(
        raw.trailing_words,
        defaults.trailing_words,
        "notes.trailing_words",
        path,
    )?;

    Ok(NotesSection {
        path: resolve_against(base_dir, &notes_path),
        rule: SubjectRule {
            leading_words,
            trailing_words,
        },
    })
}

fn word_count(
    raw: Option<i64>,
    default: usize,
    field: &'static str,
    path: &Path,
) -> Result<usize, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    usize::try_from(value)
        .ok()
        .filter(|count| *count <= MAX_SUBJECT_WORDS)
        .ok_or_else(|| ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: format!("Use a word count between 0 and {MAX_SUBJECT_WORDS}"),
        })
}
