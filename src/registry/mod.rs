//! Explicit handler registry built once at startup and shared by reference.
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::lib::{
    errors::{HandlerError, RegistryError},
    telemetry::DispatchSpan,
};

pub mod args;
pub mod descriptor;

pub use args::Arguments;
pub use descriptor::{HandlerDescriptor, HandlerKind, ParamSpec, ParamType};

/// Output of a handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Prompt and resource output.
    Text(String),
    /// Tool output.
    Value(Value),
}

impl Invocation {
    /// Render as text for MCP content blocks.
    pub fn into_text(self) -> String {
        match self {
            Invocation::Text(text) => text,
            Invocation::Value(Value::String(text)) => text,
            Invocation::Value(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Handler body: validated arguments in, invocation out.
pub type Handler = Box<dyn Fn(&Arguments) -> Result<Invocation, HandlerError> + Send + Sync>;

struct Entry {
    descriptor: HandlerDescriptor,
    handler: Handler,
}

/// Table of handlers keyed by `(kind, name)`, kept in registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<(HandlerKind, String), usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its descriptor.
    pub fn add<F>(&mut self, descriptor: HandlerDescriptor, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&Arguments) -> Result<Invocation, HandlerError> + Send + Sync + 'static,
    {
        let key = (descriptor.kind, descriptor.name.clone());
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateName {
                kind: descriptor.kind,
                name: descriptor.name,
            });
        }
        tracing::debug!(
            target: "productivity_mcp::registry",
            kind = descriptor.kind.as_str(),
            name = %descriptor.name,
            parameters = descriptor.parameters.len(),
            "Registered handler"
        );
        self.index.insert(key, self.entries.len());
        self.entries.push(Entry {
            descriptor,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Register a parameterless handler.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        kind: HandlerKind,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&Arguments) -> Result<Invocation, HandlerError> + Send + Sync + 'static,
    {
        self.add(HandlerDescriptor::new(kind, name, ""), handler)
    }

    /// Validate arguments and invoke the matching handler synchronously.
    pub fn dispatch(
        &self,
        name: &str,
        kind: HandlerKind,
        args: Option<&Map<String, Value>>,
    ) -> Result<Invocation, RegistryError> {
        let span = DispatchSpan::start(kind, name);
        let result = self.dispatch_inner(name, kind, args);
        span.finish(match &result {
            Ok(_) => "ok",
            Err(RegistryError::UnknownHandler { .. }) => "unknown_handler",
            Err(RegistryError::InvalidArgument { .. }) => "invalid_argument",
            Err(_) => "failed",
        });
        result
    }

    fn dispatch_inner(
        &self,
        name: &str,
        kind: HandlerKind,
        args: Option<&Map<String, Value>>,
    ) -> Result<Invocation, RegistryError> {
        let entry = self
            .index
            .get(&(kind, name.to_string()))
            .and_then(|&idx| self.entries.get(idx))
            .ok_or_else(|| RegistryError::UnknownHandler {
                kind,
                name: name.to_string(),
            })?;

        let arguments = Arguments::validate(&entry.descriptor, args).map_err(
            |(argument, reason)| RegistryError::InvalidArgument {
                kind,
                name: name.to_string(),
                argument,
                reason,
            },
        )?;

        (entry.handler)(&arguments).map_err(|source| RegistryError::Handler {
            kind,
            name: name.to_string(),
            source,
        })
    }

    pub fn descriptor(&self, kind: HandlerKind, name: &str) -> Option<&HandlerDescriptor> {
        self.index
            .get(&(kind, name.to_string()))
            .and_then(|&idx| self.entries.get(idx))
            .map(|entry| &entry.descriptor)
    }

    /// Descriptors of one kind in registration order.
    pub fn descriptors(&self, kind: HandlerKind) -> impl Iterator<Item = &HandlerDescriptor> {
        self.entries
            .iter()
            .map(|entry| &entry.descriptor)
            .filter(move |descriptor| descriptor.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
