//! Argument validation against a handler's declared parameters.
use serde_json::{Map, Number, Value};

use crate::lib::errors::HandlerError;

use super::descriptor::{HandlerDescriptor, ParamSpec, ParamType};

/// Validated arguments handed to a handler. Defaults are already applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

/// Why an argument was rejected: `(argument, reason)`.
pub type ArgumentRejection = (String, String);

impl Arguments {
    /// Check `raw` against `descriptor` and fill in defaults.
    pub fn validate(
        descriptor: &HandlerDescriptor,
        raw: Option<&Map<String, Value>>,
    ) -> Result<Self, ArgumentRejection> {
        let empty = Map::new();
        let raw = raw.unwrap_or(&empty);

        if let Some(unknown) = raw
            .keys()
            .find(|key| descriptor.parameter(key.as_str()).is_none())
        {
            return Err((unknown.clone(), "unknown argument".into()));
        }

        let mut values = Map::new();
        for spec in &descriptor.parameters {
            match raw.get(spec.name) {
                Some(Value::Null) | None => match &spec.default {
                    None => {
                        return Err((spec.name.to_string(), "required argument is missing".into()))
                    }
                    Some(Value::Null) => {}
                    Some(default) => {
                        values.insert(spec.name.to_string(), default.clone());
                    }
                },
                Some(value) => {
                    let coerced = coerce(spec, value)
                        .ok_or_else(|| (spec.name.to_string(), type_mismatch(spec, value)))?;
                    values.insert(spec.name.to_string(), coerced);
                }
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn required_str(&self, name: &str) -> Result<&str, HandlerError> {
        self.str(name).ok_or_else(|| missing(name))
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn required_int(&self, name: &str) -> Result<i64, HandlerError> {
        self.int(name).ok_or_else(|| missing(name))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn missing(name: &str) -> HandlerError {
    HandlerError::MissingArgument {
        argument: name.to_string(),
    }
}

fn type_mismatch(spec: &ParamSpec, value: &Value) -> String {
    format!(
        "expected {}, got {}",
        spec.ty.schema_type(),
        json_type_name(value)
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Prompt arguments always arrive as strings, so numeric and boolean
/// parameters also accept their string spelling.
fn coerce(spec: &ParamSpec, value: &Value) -> Option<Value> {
    match (spec.ty, value) {
        (ParamType::String, Value::String(_)) => Some(value.clone()),
        (ParamType::Integer, Value::Number(n)) => n.as_i64().map(Value::from),
        (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ParamType::Number, Value::Number(_)) => Some(value.clone()),
        (ParamType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (ParamType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ParamType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}
