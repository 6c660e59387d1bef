use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use rmcp::model::ErrorData;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::registry::HandlerKind;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Registry-level failures. None of them are retryable.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} `{name}` is already registered")]
    DuplicateName { kind: HandlerKind, name: String },
    #[error("no {kind} named `{name}` is registered")]
    UnknownHandler { kind: HandlerKind, name: String },
    #[error("invalid argument `{argument}` for {kind} `{name}`: {reason}")]
    InvalidArgument {
        kind: HandlerKind,
        name: String,
        argument: String,
        reason: String,
    },
    #[error("{kind} `{name}` failed: {source}")]
    Handler {
        kind: HandlerKind,
        name: String,
        #[source]
        source: HandlerError,
    },
}

/// Failures raised from inside a handler body.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("argument `{argument}` is missing or has the wrong type")]
    MissingArgument { argument: String },
    #[error(transparent)]
    Notes(#[from] NotesError),
    #[error("failed to serialize handler output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The notes document could not be split into sections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentParseError {
    #[error("code fence opened on line {line} is never closed")]
    UnterminatedFence { line: usize },
    #[error("section `{title}` appears more than once (line {line})")]
    DuplicateSection { title: String, line: usize },
}

/// Failures while reading or writing the notes document.
#[derive(Debug, Error)]
pub enum NotesError {
    #[error("I/O failed for notes document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("notes document {path} is not valid UTF-8")]
    Encoding { path: PathBuf },
    #[error("notes document changed since it was previewed (expected {expected}, found {actual})")]
    DigestMismatch { expected: String, actual: String },
    #[error("notes entry is empty")]
    EmptyEntry,
    #[error("section name {section:?} {reason}")]
    InvalidSection { section: String, reason: &'static str },
    #[error("entry timestamp {value:?} is not in `YYYY-MM-DD HH:MM` form")]
    InvalidTimestamp { value: String },
    #[error("notes store lock was poisoned")]
    Poisoned,
}

/// JSON-RPC error class an MCP-facing error is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidParams,
    ResourceNotFound,
    Internal,
}

/// Structured error metadata returned by MCP handlers.
#[derive(Debug, Clone)]
pub struct ToolErrorDescriptor {
    /// Error code.
    pub code: &'static str,
    /// Default user-facing message.
    pub message: &'static str,
    /// Recommended remediation.
    pub remediation: &'static str,
    pub class: ErrorClass,
}

impl ToolErrorDescriptor {
    /// Simple constructor.
    pub const fn new(
        code: &'static str,
        message: &'static str,
        remediation: &'static str,
        class: ErrorClass,
    ) -> Self {
        Self {
            code,
            message,
            remediation,
            class,
        }
    }

    /// Create a builder.
    pub fn builder(&self) -> ToolErrorDescriptorBuilder<'_> {
        ToolErrorDescriptorBuilder::new(self)
    }
}

/// Builder for error data that fails if required fields are missing.
pub struct ToolErrorDescriptorBuilder<'a> {
    descriptor: &'a ToolErrorDescriptor,
    message: Option<String>,
    retryable: Option<bool>,
    details: Option<Value>,
}

impl<'a> ToolErrorDescriptorBuilder<'a> {
    pub fn new(descriptor: &'a ToolErrorDescriptor) -> Self {
        Self {
            descriptor,
            message: None,
            retryable: None,
            details: None,
        }
    }

    /// Replace the descriptor's default message (used to surface errors verbatim).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn build(self) -> Result<ErrorData, ToolErrorBuilderError> {
        if self.descriptor.remediation.trim().is_empty() {
            return Err(ToolErrorBuilderError::MissingRemediation {
                code: self.descriptor.code,
            });
        }
        let retryable = self
            .retryable
            .ok_or(ToolErrorBuilderError::MissingRetryable {
                code: self.descriptor.code,
            })?;

        let mut data = Map::new();
        data.insert("code".into(), Value::String(self.descriptor.code.into()));
        data.insert(
            "remediation".into(),
            Value::String(self.descriptor.remediation.into()),
        );
        data.insert("retryable".into(), Value::Bool(retryable));
        if let Some(details) = self.details {
            data.insert("details".into(), details);
        }

        let message = self
            .message
            .unwrap_or_else(|| self.descriptor.message.to_string());
        let data = Some(Value::Object(data));
        Ok(match self.descriptor.class {
            ErrorClass::InvalidParams => ErrorData::invalid_params(message, data),
            ErrorClass::ResourceNotFound => ErrorData::resource_not_found(message, data),
            ErrorClass::Internal => ErrorData::internal_error(message, data),
        })
    }
}

/// Errors when required builder fields are missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolErrorBuilderError {
    #[error("retryable is missing (code={code})")]
    MissingRetryable { code: &'static str },
    #[error("remediation is empty (code={code})")]
    MissingRemediation { code: &'static str },
}

pub const UNKNOWN_HANDLER_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "UNKNOWN_HANDLER",
    "No prompt or tool with that name is registered",
    "List the available prompts and tools and retry with one of their names.",
    ErrorClass::InvalidParams,
);

pub const UNKNOWN_RESOURCE_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "UNKNOWN_RESOURCE",
    "No resource with that URI is registered",
    "List the available resources and retry with one of their URIs.",
    ErrorClass::ResourceNotFound,
);

pub const INVALID_ARGUMENT_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "INVALID_ARGUMENT",
    "Arguments do not match the handler's declared parameters",
    "Pass every required parameter with the declared type and drop unknown ones.",
    ErrorClass::InvalidParams,
);

pub const NOTES_CHANGED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "NOTES_DOCUMENT_CHANGED",
    "The notes document changed after it was previewed",
    "Run the `remember` prompt again and confirm the new preview before committing.",
    ErrorClass::InvalidParams,
);

pub const NOTES_EMPTY_ENTRY_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "NOTES_EMPTY_ENTRY",
    "The content to remember is empty",
    "Pass a non-empty statement in `content`.",
    ErrorClass::InvalidParams,
);

pub const HANDLER_FAILED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "HANDLER_FAILED",
    "The handler failed while producing its result",
    "Check the server log and the notes document path, then retry.",
    ErrorClass::Internal,
);
