#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use pixrun::flow::{FlowController, InvocationRequest};
use serde_json::{Map, Value};

use crate::{FakeBackend, StubLocator};

/// Robot path used by tests that do not care where the robot lives.
pub fn test_robot_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\pix\Robot.exe")
    } else {
        PathBuf::from("/opt/pix/Robot.exe")
    }
}

/// Build a `script_parameters` mapping from a `serde_json::json!` object.
pub fn mapping(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Builder for `InvocationRequest`, defaulting to a headless run of
/// `task.pix` with an explicit robot path.
pub struct RequestBuilder {
    request: InvocationRequest,
}

impl RequestBuilder {
    pub fn new(script: &str) -> Self {
        Self {
            request: InvocationRequest::new(script)
                .with_robot_path(test_robot_path())
                .with_gui(false),
        }
    }

    pub fn params(mut self, params: Value) -> Self {
        self.request = self.request.with_parameters(mapping(params));
        self
    }

    pub fn raw_params(mut self, params: &str) -> Self {
        self.request = self.request.with_parameters(params);
        self
    }

    pub fn gui(mut self, need_gui: bool) -> Self {
        self.request = self.request.with_gui(need_gui);
        self
    }

    pub fn without_robot_path(mut self) -> Self {
        self.request.robot_path = None;
        self
    }

    pub fn build(self) -> InvocationRequest {
        self.request
    }
}

/// Flow controller over fakes, decoding output as UTF-8.
pub fn fake_controller(locator: StubLocator, backend: FakeBackend) -> FlowController {
    FlowController::new(Arc::new(locator), Arc::new(backend), encoding_rs::UTF_8)
}
