//! Declarative parameter tables for tool actions.
//!
//! Each provider tool declares its actions as `&'static` [`ActionSpec`]
//! tables. The dispatch core validates incoming arguments against these
//! tables before any network call, and each tool's MCP input schema is
//! generated from the same data, so schema and validation cannot drift
//! apart.
//!
//! Validation is strict: a string `"5"` is not an integer and a float is
//! not an integer. Checks run per parameter in declaration order
//! (presence, then type, then range/enum) and the first violation wins.

use rmcp::model::JsonObject;
use serde_json::{Map, Value, json};

use super::error::ToolError;

/// The JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Object,
    /// String restricted to a fixed set of values.
    Enum(&'static [&'static str]),
}

impl ParamKind {
    /// Name used in type-mismatch messages.
    fn expected_name(self) -> &'static str {
        match self {
            Self::String | Self::Enum(_) => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Boolean => "boolean",
            Self::List => "array",
            Self::Object => "object",
        }
    }
}

/// Specification of a single named parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub description: &'static str,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            min: None,
            max: None,
            description,
        }
    }

    /// An optional string parameter.
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    /// An optional integer parameter.
    pub const fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    /// An optional floating-point parameter (accepts integral numbers too).
    pub const fn float(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Float, description)
    }

    /// An optional boolean parameter.
    pub const fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    /// An optional list parameter.
    pub const fn list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::List, description)
    }

    /// An optional object parameter.
    pub const fn object(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Object, description)
    }

    /// An optional enum parameter restricted to `options`.
    pub const fn options(
        name: &'static str,
        options: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, ParamKind::Enum(options), description)
    }

    /// Mark this parameter as required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Constrain a numeric parameter to an inclusive range.
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Validate a present, non-null value against this spec.
    fn check(&self, value: &Value) -> Result<(), ToolError> {
        match self.kind {
            ParamKind::String => {
                value.as_str().ok_or_else(|| self.type_error(value))?;
            }
            ParamKind::Integer => {
                let n = value.as_i64().ok_or_else(|| self.type_error(value))?;
                self.check_range(n as f64)?;
            }
            ParamKind::Float => {
                let n = value.as_f64().ok_or_else(|| self.type_error(value))?;
                self.check_range(n)?;
            }
            ParamKind::Boolean => {
                value.as_bool().ok_or_else(|| self.type_error(value))?;
            }
            ParamKind::List => {
                if !value.is_array() {
                    return Err(self.type_error(value));
                }
            }
            ParamKind::Object => {
                if !value.is_object() {
                    return Err(self.type_error(value));
                }
            }
            ParamKind::Enum(options) => {
                let s = value.as_str().ok_or_else(|| self.type_error(value))?;
                if !options.contains(&s) {
                    return Err(ToolError::invalid_value(
                        self.name,
                        format!("must be one of: {}", options.join(", ")),
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_range(&self, n: f64) -> Result<(), ToolError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if n < min || n > max {
                return Err(ToolError::invalid_value(
                    self.name,
                    format!("must be between {} and {}", fmt_bound(min), fmt_bound(max)),
                ));
            }
        }
        Ok(())
    }

    fn type_error(&self, value: &Value) -> ToolError {
        ToolError::InvalidParameterType {
            name: self.name,
            expected: self.kind.expected_name(),
            actual: json_type_name(value),
        }
    }

    /// JSON Schema fragment for this parameter.
    fn schema(&self) -> Value {
        let mut obj = Map::new();
        match self.kind {
            ParamKind::String => {
                obj.insert("type".to_string(), json!("string"));
            }
            ParamKind::Integer => {
                obj.insert("type".to_string(), json!("integer"));
            }
            ParamKind::Float => {
                obj.insert("type".to_string(), json!("number"));
            }
            ParamKind::Boolean => {
                obj.insert("type".to_string(), json!("boolean"));
            }
            ParamKind::List => {
                obj.insert("type".to_string(), json!("array"));
            }
            ParamKind::Object => {
                obj.insert("type".to_string(), json!("object"));
            }
            ParamKind::Enum(options) => {
                obj.insert("type".to_string(), json!("string"));
                obj.insert("enum".to_string(), json!(options));
            }
        }
        if let Some(min) = self.min {
            obj.insert("minimum".to_string(), number_bound(self.kind, min));
        }
        if let Some(max) = self.max {
            obj.insert("maximum".to_string(), number_bound(self.kind, max));
        }
        obj.insert("description".to_string(), json!(self.description));
        Value::Object(obj)
    }
}

/// Specification of one action exposed by a tool.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ActionSpec {
    /// Validate a raw argument map against this action's parameters.
    ///
    /// Unknown extra arguments are ignored. `null` counts as absent.
    pub fn validate(&self, args: &JsonObject) -> Result<(), ToolError> {
        for param in self.params {
            match args.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ToolError::MissingParameter(param.name));
                    }
                }
                Some(value) => param.check(value)?,
            }
        }
        Ok(())
    }
}

/// Build the MCP input schema for a tool from its action table.
///
/// The schema is an object with an `action` enum property plus the union
/// of every action's parameters; only `action` is listed as required,
/// since per-action requirements are enforced at dispatch time.
pub fn input_schema(actions: &'static [ActionSpec]) -> JsonObject {
    let mut properties = Map::new();
    let action_names: Vec<&str> = actions.iter().map(|a| a.name).collect();
    properties.insert(
        "action".to_string(),
        json!({
            "type": "string",
            "enum": action_names,
            "description": "The action to perform",
        }),
    );

    for action in actions {
        for param in action.params {
            properties
                .entry(param.name.to_string())
                .or_insert_with(|| param.schema());
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), json!(["action"]));
    schema
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a numeric bound without a trailing `.0` for integer parameters.
fn number_bound(kind: ParamKind, bound: f64) -> Value {
    if matches!(kind, ParamKind::Integer) {
        json!(bound as i64)
    } else {
        json!(bound)
    }
}

fn fmt_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        format!("{}", bound)
    }
}
