//! Handler descriptors: name, kind, and declared parameters.
use std::fmt;

use serde_json::{json, Map, Value};

/// What a registered handler is exposed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerKind {
    Prompt,
    Tool,
    Resource,
}

impl HandlerKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Prompt => "prompt",
            HandlerKind::Tool => "tool",
            HandlerKind::Resource => "resource",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// JSON Schema `type` keyword.
    pub const fn schema_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// One declared parameter. A parameter without a default is required.
///
/// `Some(Value::Null)` as the default marks an optional parameter that is
/// simply absent when the caller omits it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            default: None,
            description,
        }
    }

    pub fn optional(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            default: Some(Value::Null),
            description,
        }
    }

    pub fn with_default(
        name: &'static str,
        ty: ParamType,
        default: impl Into<Value>,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            default: Some(default.into()),
            description,
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Immutable description of a registered handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDescriptor {
    /// Unique within its kind. Resources use their URI.
    pub name: String,
    pub kind: HandlerKind,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl HandlerDescriptor {
    pub fn new(kind: HandlerKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn prompt(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(HandlerKind::Prompt, name, description)
    }

    pub fn tool(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(HandlerKind::Tool, name, description)
    }

    pub fn resource(uri: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(HandlerKind::Resource, uri, description)
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|spec| spec.name == name)
    }

    /// JSON Schema object describing the parameters (used as a tool input schema).
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for spec in &self.parameters {
            let mut property = Map::new();
            property.insert("type".into(), json!(spec.ty.schema_type()));
            if !spec.description.is_empty() {
                property.insert("description".into(), json!(spec.description));
            }
            match &spec.default {
                None => required.push(json!(spec.name)),
                Some(Value::Null) => {}
                Some(value) => {
                    property.insert("default".into(), value.clone());
                }
            }
            properties.insert(spec.name.to_string(), Value::Object(property));
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema.insert("additionalProperties".into(), json!(false));
        schema
    }
}
