// src/flow/definition.rs

//! Declarative description of the runner flow for an orchestrator.
//!
//! Nothing is registered as a side effect of loading this crate: the entry
//! point builds a [`FlowDefinition`] explicitly and hands it to whatever
//! needs it.

use serde_json::Value;

use crate::config::FlowSection;
use crate::exec::{ResourceTag, RunnerVariant};
use crate::flow::request::{
    PARAM_NEED_GUI, PARAM_ROBOT_PATH, PARAM_SCRIPT_PARAMETERS, PARAM_SCRIPT_PATH,
};

/// Prefix of a parent (starter) run name.
pub const STARTER_PREFIX: &str = "STARTER_";
/// Prefix of a child (runner) run name.
pub const RUNNER_PREFIX: &str = "RUNNER_";

pub fn starter_run_name(name: &str) -> String {
    format!("{STARTER_PREFIX}{name}")
}

pub fn runner_run_name(name: &str) -> String {
    format!("{RUNNER_PREFIX}{name}")
}

/// A typed flow input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

/// An independently schedulable unit of the flow.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub tags: Vec<ResourceTag>,
}

/// The runner flow: its identity, inputs and tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDefinition {
    pub name: String,
    pub project: String,
    pub labels: Vec<String>,
    pub parameters: Vec<ParameterSpec>,
    pub tasks: Vec<TaskSpec>,
}

impl FlowDefinition {
    /// The runner flow with the given registration settings.
    pub fn run_pix(section: &FlowSection) -> Self {
        let parameters = vec![
            ParameterSpec {
                name: PARAM_SCRIPT_PATH,
                required: true,
                default: None,
            },
            ParameterSpec {
                name: PARAM_SCRIPT_PARAMETERS,
                required: false,
                default: None,
            },
            ParameterSpec {
                name: PARAM_ROBOT_PATH,
                required: false,
                default: None,
            },
            ParameterSpec {
                name: PARAM_NEED_GUI,
                required: false,
                default: Some(Value::Bool(true)),
            },
        ];

        let tasks = vec![
            TaskSpec {
                name: "combine_cmd_pix",
                tags: Vec::new(),
            },
            TaskSpec {
                name: "bool_param",
                tags: Vec::new(),
            },
            TaskSpec {
                name: RunnerVariant::Gui.task_name(),
                tags: RunnerVariant::Gui.resource_tags(),
            },
            TaskSpec {
                name: RunnerVariant::Headless.task_name(),
                tags: RunnerVariant::Headless.resource_tags(),
            },
        ];

        Self {
            name: section.name.clone(),
            project: section.project.clone(),
            labels: section.labels.clone(),
            parameters,
            tasks,
        }
    }

    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_names() {
        assert_eq!(starter_run_name("test_task"), "STARTER_test_task");
        assert_eq!(runner_run_name("test_task"), "RUNNER_test_task");
    }

    #[test]
    fn default_definition() {
        let def = FlowDefinition::run_pix(&FlowSection::default());
        assert_eq!(def.name, "run_pix");
        assert_eq!(def.project, "pix_robots");

        let required: Vec<_> = def.required_parameters().map(|p| p.name).collect();
        assert_eq!(required, vec!["script_path"]);

        let gui = def.task("run_cmd_w_gui").unwrap();
        assert!(gui.tags.contains(&ResourceTag::new("gui", 1)));
        let headless = def.task("run_cmd").unwrap();
        assert!(!headless.tags.contains(&ResourceTag::new("gui", 1)));
        assert!(def.task("combine_cmd_pix").unwrap().tags.is_empty());
    }
}
