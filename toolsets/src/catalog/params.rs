//! Argument extraction for tool handlers.
//!
//! Failures are [`ToolsetError::InvalidArguments`], which handlers surface
//! to the agent as tool-level error results.

use rmcp::model::JsonObject;
use serde_json::Value;

use crate::error::{ToolsetError, ToolsetResult};

pub fn required_str(args: &JsonObject, name: &str) -> ToolsetResult<String> {
    match args.get(name) {
        None | Some(Value::Null) => Err(missing(name)),
        Some(Value::String(s)) if s.is_empty() => Err(missing(name)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(name, "string", other)),
    }
}

pub fn optional_str(args: &JsonObject, name: &str) -> ToolsetResult<Option<String>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_type(name, "string", other)),
    }
}

/// Integers arrive as JSON numbers; whole floats are accepted since some
/// clients send `1.0`.
pub fn optional_int(args: &JsonObject, name: &str) -> ToolsetResult<Option<i64>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0) {
                Ok(Some(f as i64))
            } else {
                Err(wrong_type(name, "integer", &Value::Number(n.clone())))
            }
        }
        Some(other) => Err(wrong_type(name, "integer", other)),
    }
}

pub fn optional_bool(args: &JsonObject, name: &str) -> ToolsetResult<Option<bool>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(wrong_type(name, "boolean", other)),
    }
}

pub fn optional_object(args: &JsonObject, name: &str) -> ToolsetResult<Option<JsonObject>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m.clone())),
        Some(other) => Err(wrong_type(name, "object", other)),
    }
}

fn missing(name: &str) -> ToolsetError {
    ToolsetError::InvalidArguments(format!("missing required parameter: {}", name))
}

fn wrong_type(name: &str, expected: &str, got: &Value) -> ToolsetError {
    let got = match got {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ToolsetError::InvalidArguments(format!(
        "parameter {} is not of type {}, is {}",
        name, expected, got
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(m) => m,
            _ => JsonObject::new(),
        }
    }

    #[test]
    fn test_required_str() {
        let a = args(json!({"owner": "octo", "empty": "", "n": 3}));
        assert_eq!(required_str(&a, "owner").unwrap(), "octo");

        let err = required_str(&a, "repo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid arguments: missing required parameter: repo"
        );
        assert!(required_str(&a, "empty").is_err());

        let err = required_str(&a, "n").unwrap_err();
        assert!(err.to_string().contains("is not of type string, is number"));
    }

    #[test]
    fn test_optional_int_accepts_whole_floats() {
        let a = args(json!({"page": 2, "per_page": 30.0, "bad": 1.5, "s": "x"}));
        assert_eq!(optional_int(&a, "page").unwrap(), Some(2));
        assert_eq!(optional_int(&a, "per_page").unwrap(), Some(30));
        assert_eq!(optional_int(&a, "missing").unwrap(), None);
        assert!(optional_int(&a, "bad").is_err());
        assert!(optional_int(&a, "s").is_err());
    }

    #[test]
    fn test_optional_bool_and_str() {
        let a = args(json!({"draft": true, "body": null}));
        assert_eq!(optional_bool(&a, "draft").unwrap(), Some(true));
        assert_eq!(optional_str(&a, "body").unwrap(), None);
        assert!(optional_bool(&args(json!({"draft": "yes"})), "draft").is_err());
    }
}
