// src/locate/registry.rs

//! Registry-backed locator.
//!
//! The studio registers itself as the `open` handler of its document type.
//! The default value of that key is a command such as
//! `"C:\Program Files\PIX\Studio.exe" "%1"`; the first quoted part is the
//! editor, and the robot lives next to it.
//!
//! `reg.exe` writes in the console codepage, so its output is decoded with
//! `[robot].encoding` rather than as UTF-8.

use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;
use tracing::{debug, error};

use super::{derive_robot_path, not_found, LocatorStrategy};
use crate::errors::Result;
use crate::exec::decode_output;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("static regex is valid"));

/// Extract the editor path from `reg query ... /ve` output.
///
/// Only the value part of the first `REG_SZ` / `REG_EXPAND_SZ` line is
/// considered; the editor is its first double-quoted substring.
pub fn parse_registry_command(output: &str) -> Option<PathBuf> {
    output
        .lines()
        .find_map(|line| {
            ["REG_EXPAND_SZ", "REG_SZ"]
                .iter()
                .find_map(|kind| line.split_once(kind).map(|(_, value)| value))
        })
        .and_then(|value| QUOTED.captures(value))
        .map(|caps| PathBuf::from(&caps[1]))
}

/// Decode raw `reg query` output and extract the editor path from it.
pub fn parse_registry_output(stdout: &[u8], encoding: &'static Encoding) -> Option<PathBuf> {
    parse_registry_command(&decode_output(stdout, encoding))
}

/// Locator that queries the Windows registry through `reg.exe`.
///
/// The query blocks; async callers run it off the runtime threads.
#[derive(Debug, Clone)]
pub struct RegistryLocator {
    key: String,
    encoding: &'static Encoding,
}

impl RegistryLocator {
    pub fn new(key: impl Into<String>, encoding: &'static Encoding) -> Self {
        Self {
            key: key.into(),
            encoding,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn query_default_value(&self) -> Result<Vec<u8>> {
        let output = Command::new("reg")
            .args(["query", &self.key, "/ve"])
            .output()
            .map_err(|e| not_found(format_args!("could not run reg.exe: {e}")))?;

        if !output.status.success() {
            return Err(not_found(format_args!(
                "registry key '{}' does not exist",
                self.key
            )));
        }

        Ok(output.stdout)
    }
}

impl LocatorStrategy for RegistryLocator {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn locate(&self) -> Result<PathBuf> {
        if !cfg!(windows) {
            return Err(not_found(
                "registry lookup is only available on Windows; use the env or config locator",
            ));
        }

        let value = self.query_default_value().inspect_err(|err| {
            error!(key = %self.key, error = %err, "registry lookup failed");
        })?;

        let editor = parse_registry_output(&value, self.encoding).ok_or_else(|| {
            not_found(format_args!(
                "registry key '{}' has no quoted executable path",
                self.key
            ))
        })?;

        let robot = derive_robot_path(&editor);
        debug!(editor = %editor.display(), robot = %robot.display(), "robot path derived from registry");
        Ok(robot)
    }
}
