// src/config/model.rs

use std::path::PathBuf;

use encoding_rs::Encoding;
use serde::Deserialize;

use crate::errors::{PixError, Result};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [robot]
/// path = 'C:\Program Files\PIX\Robot.exe'
/// encoding = "cp866"
///
/// [locator]
/// strategy = "registry"
///
/// [flow]
/// name = "run_pix"
/// project = "pix_robots"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub robot: RobotSection,

    #[serde(default)]
    pub locator: LocatorSection,

    #[serde(default)]
    pub flow: FlowSection,

    #[serde(default)]
    pub deploy: DeploySection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub robot: RobotSection,
    pub locator: LocatorSection,
    pub flow: FlowSection,
    pub deploy: DeploySection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            robot: raw.robot,
            locator: raw.locator,
            flow: raw.flow,
            deploy: raw.deploy,
        }
    }

    /// Codepage for decoding robot output.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.robot.encoding.as_bytes()).ok_or_else(|| {
            PixError::ConfigError(format!(
                "[robot].encoding '{}' is not a known encoding label",
                self.robot.encoding
            ))
        })
    }
}

/// `[robot]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotSection {
    /// Explicit path to the robot executor. Used by the `config` locator
    /// strategy.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Codepage used to decode child stdout/stderr.
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "cp866".to_string()
}

impl Default for RobotSection {
    fn default() -> Self {
        Self {
            path: None,
            encoding: default_encoding(),
        }
    }
}

/// Which discovery strategy resolves the robot executor when a request
/// does not carry `robot_path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    /// Windows file-association registry entry of the studio document type.
    #[default]
    Registry,
    /// An environment variable holding the executor path.
    Env,
    /// `[robot].path` from this file.
    Config,
}

/// `[locator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LocatorSection {
    #[serde(default)]
    pub strategy: LocatorKind,

    #[serde(default = "default_env_var")]
    pub env_var: String,

    #[serde(default = "default_registry_key")]
    pub registry_key: String,
}

fn default_env_var() -> String {
    "PIX_ROBOT_PATH".to_string()
}

fn default_registry_key() -> String {
    r"HKCR\Studio.Document\shell\open\command".to_string()
}

impl Default for LocatorSection {
    fn default() -> Self {
        Self {
            strategy: LocatorKind::default(),
            env_var: default_env_var(),
            registry_key: default_registry_key(),
        }
    }
}

/// `[flow]` section: how the runner flow is registered with the orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowSection {
    #[serde(default = "default_flow_name")]
    pub name: String,

    #[serde(default = "default_project")]
    pub project: String,

    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

fn default_flow_name() -> String {
    "run_pix".to_string()
}

fn default_project() -> String {
    "pix_robots".to_string()
}

fn default_labels() -> Vec<String> {
    vec!["prefect".to_string()]
}

impl Default for FlowSection {
    fn default() -> Self {
        Self {
            name: default_flow_name(),
            project: default_project(),
            labels: default_labels(),
        }
    }
}

/// `[deploy]` section: names of the secrets holding deployment settings.
///
/// These only describe where the flow definition lives and which task
/// backend it is shipped to; they never change how a robot run behaves.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploySection {
    #[serde(default = "default_repo_secret")]
    pub repo_secret: String,

    #[serde(default = "default_host_secret")]
    pub host_secret: String,

    #[serde(default = "default_branch_secret")]
    pub branch_secret: String,

    #[serde(default = "default_scheduler_secret")]
    pub scheduler_secret: String,
}

fn default_repo_secret() -> String {
    "GIT_REPO".to_string()
}

fn default_host_secret() -> String {
    "GIT_SERVER_HOST".to_string()
}

fn default_branch_secret() -> String {
    "GIT_BRANCH".to_string()
}

fn default_scheduler_secret() -> String {
    "DASK_SCHEDULER_ADDRESS".to_string()
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            repo_secret: default_repo_secret(),
            host_secret: default_host_secret(),
            branch_secret: default_branch_secret(),
            scheduler_secret: default_scheduler_secret(),
        }
    }
}

impl DeploySection {
    /// `(secret name, value)` pairs, with values looked up in the
    /// environment. Missing secrets resolve to `None`.
    pub fn resolve_from_env(&self) -> Vec<(String, Option<String>)> {
        [
            &self.repo_secret,
            &self.host_secret,
            &self.branch_secret,
            &self.scheduler_secret,
        ]
        .into_iter()
        .map(|name| (name.clone(), std::env::var(name).ok()))
        .collect()
    }
}
