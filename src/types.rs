use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::PixError;

/// Values accepted as "true" by the loose boolean coercion.
///
/// Comparison is case-insensitive and does not trim whitespace. Anything
/// not in this table is `false`, including `"false"` itself.
pub const TRUTHY_STRINGS: [&str; 4] = ["yes", "y", "true", "1"];

/// Returns `true` if `s` (lowercased) is one of [`TRUTHY_STRINGS`].
pub fn is_truthy_str(s: &str) -> bool {
    let lowered = s.to_lowercase();
    TRUTHY_STRINGS.contains(&lowered.as_str())
}

/// Coerce a loosely-typed JSON value into a boolean.
///
/// Each value is first rendered the way an upstream string-typed caller
/// would render it (`true` -> `"true"`, `1` -> `"1"`, `1.0` -> `"1.0"`)
/// and then checked against the truthy table.
pub fn coerce_loose_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => is_truthy_str(s),
        Value::Number(n) => is_truthy_str(&n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Script parameters as handed to the robot via `-p=`.
///
/// The two variants are encoded differently on the command line:
/// - `Raw` is passed through verbatim, wrapped in double quotes.
/// - `Structured` is serialized to JSON text, unquoted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Raw(String),
    Structured(Map<String, Value>),
}

impl TryFrom<Value> for ParameterValue {
    type Error = PixError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(ParameterValue::Raw(s)),
            Value::Object(map) => Ok(ParameterValue::Structured(map)),
            other => Err(PixError::InvalidParameter(format!(
                "script_parameters must be a string or a mapping, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Raw(value.to_string())
    }
}

impl From<Map<String, Value>> for ParameterValue {
    fn from(value: Map<String, Value>) -> Self {
        ParameterValue::Structured(value)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

/// Ordered argument list for the robot executor.
///
/// The first token is always the executor path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    /// Build a command line from raw tokens. Returns `None` when empty.
    pub fn from_tokens<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Undecoded output of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Decoded result of a finished child process.
///
/// Created at process completion and consumed immediately to decide
/// success or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
