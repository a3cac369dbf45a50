// src/config/validate.rs

use crate::config::model::{ConfigFile, LocatorKind, RawConfigFile};
use crate::errors::{PixError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PixError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_encoding(cfg)?;
    validate_locator(cfg)?;
    validate_flow(cfg)?;
    Ok(())
}

fn validate_encoding(cfg: &RawConfigFile) -> Result<()> {
    if encoding_rs::Encoding::for_label(cfg.robot.encoding.as_bytes()).is_none() {
        return Err(PixError::ConfigError(format!(
            "[robot].encoding '{}' is not a known encoding label",
            cfg.robot.encoding
        )));
    }
    Ok(())
}

fn validate_locator(cfg: &RawConfigFile) -> Result<()> {
    match cfg.locator.strategy {
        LocatorKind::Config if cfg.robot.path.is_none() => Err(PixError::ConfigError(
            "[locator].strategy = \"config\" requires [robot].path".to_string(),
        )),
        LocatorKind::Env if cfg.locator.env_var.trim().is_empty() => Err(
            PixError::ConfigError("[locator].env_var must not be empty".to_string()),
        ),
        LocatorKind::Registry if cfg.locator.registry_key.trim().is_empty() => Err(
            PixError::ConfigError("[locator].registry_key must not be empty".to_string()),
        ),
        _ => Ok(()),
    }
}

fn validate_flow(cfg: &RawConfigFile) -> Result<()> {
    if cfg.flow.name.trim().is_empty() {
        return Err(PixError::ConfigError(
            "[flow].name must not be empty".to_string(),
        ));
    }
    if cfg.flow.project.trim().is_empty() {
        return Err(PixError::ConfigError(
            "[flow].project must not be empty".to_string(),
        ));
    }
    Ok(())
}
