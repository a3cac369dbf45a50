// src/flow/request.rs

//! Binding of loosely-typed flow parameters into an [`InvocationRequest`].

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::PixError;
use crate::types::{coerce_loose_bool, json_type_name, ParameterValue};

/// Flow parameter names as seen by upstream callers.
pub const PARAM_SCRIPT_PATH: &str = "script_path";
pub const PARAM_SCRIPT_PARAMETERS: &str = "script_parameters";
pub const PARAM_ROBOT_PATH: &str = "robot_path";
pub const PARAM_NEED_GUI: &str = "need_gui";
/// Accepted alias of [`PARAM_NEED_GUI`].
pub const PARAM_GUI_VISIBLE: &str = "gui_visible";

/// One request to run a robot script.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct InvocationRequest {
    pub script_path: String,
    pub script_parameters: Option<ParameterValue>,
    pub robot_path: Option<PathBuf>,
    pub need_gui: bool,
}

impl InvocationRequest {
    pub fn new(script_path: impl Into<String>) -> Self {
        Self {
            script_path: script_path.into(),
            script_parameters: None,
            robot_path: None,
            need_gui: true,
        }
    }

    pub fn with_parameters(mut self, params: impl Into<ParameterValue>) -> Self {
        self.script_parameters = Some(params.into());
        self
    }

    pub fn with_robot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.robot_path = Some(path.into());
        self
    }

    pub fn with_gui(mut self, need_gui: bool) -> Self {
        self.need_gui = need_gui;
        self
    }

    /// Bind a parameter bundle. Unknown keys are ignored.
    ///
    /// - `script_path` must be a non-empty string.
    /// - `script_parameters` may be absent/null, a string or a mapping;
    ///   anything else is [`PixError::InvalidParameter`].
    /// - `robot_path` may be absent/null or a string.
    /// - `need_gui` (alias `gui_visible`) defaults to true and is coerced
    ///   with the loose truthy-string rule.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, PixError> {
        let script_path = match params.get(PARAM_SCRIPT_PATH) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) => {
                return Err(PixError::ConfigError(
                    "script_path must not be empty".to_string(),
                ));
            }
            Some(other) => {
                return Err(PixError::ConfigError(format!(
                    "script_path must be a string, got {}",
                    json_type_name(other)
                )));
            }
            None => {
                return Err(PixError::ConfigError(
                    "missing required parameter 'script_path'".to_string(),
                ));
            }
        };

        let script_parameters = match params.get(PARAM_SCRIPT_PARAMETERS) {
            None | Some(Value::Null) => None,
            Some(value) => Some(ParameterValue::try_from(value.clone())?),
        };

        let robot_path = match params.get(PARAM_ROBOT_PATH) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.is_empty() => Some(PathBuf::from(s)),
            Some(Value::String(_)) => {
                return Err(PixError::ConfigError(
                    "robot_path must not be empty when given".to_string(),
                ));
            }
            Some(other) => {
                return Err(PixError::ConfigError(format!(
                    "robot_path must be a string, got {}",
                    json_type_name(other)
                )));
            }
        };

        let need_gui = params
            .get(PARAM_NEED_GUI)
            .or_else(|| params.get(PARAM_GUI_VISIBLE))
            .map(coerce_loose_bool)
            .unwrap_or(true);

        Ok(Self {
            script_path,
            script_parameters,
            robot_path,
            need_gui,
        })
    }

    /// Parameter bundle for starting this request as a remote run.
    pub fn to_params(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl TryFrom<Map<String, Value>> for InvocationRequest {
    type Error = PixError;

    fn try_from(params: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_params(&params)
    }
}
