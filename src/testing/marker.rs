use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rule deciding whether a parsed body counts as a success.
///
/// Fields are either a top-level key (`success`) or a JSON pointer
/// (`/nextLesson/id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessMarker {
    /// Any well-formed JSON body.
    Json,
    /// The field is the boolean `true`.
    Flag(String),
    /// The field exists, `null` included.
    Present(String),
    /// The field is an array.
    Array(String),
    All(Vec<SuccessMarker>),
}

impl Default for SuccessMarker {
    fn default() -> Self {
        SuccessMarker::flag("success")
    }
}

impl SuccessMarker {
    pub fn flag(field: &str) -> Self {
        SuccessMarker::Flag(field.to_string())
    }

    pub fn present(field: &str) -> Self {
        SuccessMarker::Present(field.to_string())
    }

    pub fn array(field: &str) -> Self {
        SuccessMarker::Array(field.to_string())
    }

    /// `Ok` when the marker holds, otherwise a description of what was wrong.
    pub fn check(&self, body: &Value) -> Result<(), String> {
        match self {
            SuccessMarker::Json => Ok(()),
            SuccessMarker::Flag(field) => match lookup(body, field) {
                Some(Value::Bool(true)) => Ok(()),
                Some(other) => Err(format!("`{field}` is {other}, expected true")),
                None => Err(format!("`{field}` is missing")),
            },
            SuccessMarker::Present(field) => lookup(body, field)
                .map(|_| ())
                .ok_or_else(|| format!("`{field}` is missing")),
            SuccessMarker::Array(field) => match lookup(body, field) {
                Some(Value::Array(_)) => Ok(()),
                Some(other) => Err(format!("`{field}` is {}, expected an array", type_name(other))),
                None => Err(format!("`{field}` is missing")),
            },
            SuccessMarker::All(markers) => markers.iter().try_for_each(|marker| marker.check(body)),
        }
    }
}

fn lookup<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    if field.starts_with('/') {
        body.pointer(field)
    } else {
        body.get(field)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
