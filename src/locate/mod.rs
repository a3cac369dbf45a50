// src/locate/mod.rs

//! Robot executable discovery.
//!
//! A request may omit `robot_path`; the executor is then resolved through a
//! [`LocatorStrategy`] chosen at startup from `[locator].strategy`:
//!
//! - [`RegistryLocator`] reads the studio's file-association entry and
//!   derives the sibling `Robot` executable from it (Windows only).
//! - [`EnvLocator`] reads the path from an environment variable.
//! - [`ConfigLocator`] uses `[robot].path` from the config file.

pub mod env;
pub mod fixed;
pub mod registry;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::config::{ConfigFile, LocatorKind};
use crate::errors::{PixError, Result};

pub use env::EnvLocator;
pub use fixed::ConfigLocator;
pub use registry::{parse_registry_command, parse_registry_output, RegistryLocator};

/// File stem of the runner executable installed next to the studio editor.
pub const ROBOT_STEM: &str = "Robot";

/// Guidance attached to every "not found" error.
pub const NOT_INSTALLED_HINT: &str = "Robot executable not found. Is PIX Robot installed?";

/// Strategy for finding the robot executor.
///
/// The returned path may be relative; callers normalise it.
pub trait LocatorStrategy: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve the executor path or fail with [`PixError::ExecutorNotFound`].
    fn locate(&self) -> Result<PathBuf>;
}

/// Replace the file stem of `editor` with [`ROBOT_STEM`], keeping the
/// directory and the extension.
///
/// `C:\PIX\Studio.exe` becomes `C:\PIX\Robot.exe`.
pub fn derive_robot_path(editor: &Path) -> PathBuf {
    let file_name = match editor.extension() {
        Some(ext) => format!("{ROBOT_STEM}.{}", ext.to_string_lossy()),
        None => ROBOT_STEM.to_string(),
    };
    editor.with_file_name(file_name)
}

/// Build the locator selected by `[locator].strategy`.
pub fn locator_from_config(cfg: &ConfigFile) -> Result<Box<dyn LocatorStrategy>> {
    let locator: Box<dyn LocatorStrategy> = match cfg.locator.strategy {
        LocatorKind::Registry => Box::new(RegistryLocator::new(
            cfg.locator.registry_key.clone(),
            cfg.encoding()?,
        )),
        LocatorKind::Env => Box::new(EnvLocator::new(cfg.locator.env_var.clone())),
        LocatorKind::Config => {
            let path = cfg.robot.path.clone().ok_or_else(|| {
                PixError::ConfigError(
                    "[locator].strategy = \"config\" requires [robot].path".to_string(),
                )
            })?;
            Box::new(ConfigLocator::new(path))
        }
    };
    Ok(locator)
}

pub(crate) fn not_found(detail: impl std::fmt::Display) -> PixError {
    PixError::ExecutorNotFound(format!("{detail}. {NOT_INSTALLED_HINT}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    #[test]
    fn derive_keeps_directory_and_extension() {
        let editor = Path::new("/opt/pix/Studio.exe");
        assert_eq!(derive_robot_path(editor), PathBuf::from("/opt/pix/Robot.exe"));
    }

    #[test]
    fn derive_without_extension() {
        let editor = Path::new("/opt/pix/studio");
        assert_eq!(derive_robot_path(editor), PathBuf::from("/opt/pix/Robot"));
    }

    #[test]
    fn derive_uses_only_last_extension() {
        let editor = Path::new("pix/Studio.v2.exe");
        assert_eq!(derive_robot_path(editor), PathBuf::from("pix/Robot.exe"));
    }

    #[test]
    fn config_strategy_builds_config_locator() {
        let mut raw = RawConfigFile::default();
        raw.locator.strategy = LocatorKind::Config;
        raw.robot.path = Some(PathBuf::from("/opt/pix/Robot.exe"));
        let cfg = ConfigFile::try_from(raw).unwrap();

        let locator = locator_from_config(&cfg).unwrap();
        assert_eq!(locator.name(), "config");
        assert_eq!(locator.locate().unwrap(), PathBuf::from("/opt/pix/Robot.exe"));
    }

    #[test]
    fn default_strategy_is_registry() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        let locator = locator_from_config(&cfg).unwrap();
        assert_eq!(locator.name(), "registry");
    }
}
