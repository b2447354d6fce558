// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{QuickCmdError, Result};
use crate::exec::MAX_TIMEOUT;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::QuickCmdError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let timeout = validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.exec,
            raw.catalog,
            raw.session,
            timeout,
        ))
    }
}

/// Check a raw config, returning the parsed timeout.
pub fn validate_config(cfg: &RawConfigFile) -> Result<Duration> {
    let timeout = validate_timeout(cfg)?;
    validate_shell(cfg)?;
    validate_catalog(cfg)?;
    validate_session(cfg)?;
    Ok(timeout)
}

fn validate_timeout(cfg: &RawConfigFile) -> Result<Duration> {
    let timeout = parse_duration(&cfg.exec.timeout).map_err(|e| {
        QuickCmdError::ConfigError(format!("[exec].timeout: {e}"))
    })?;

    check_timeout(timeout)
        .map_err(|e| QuickCmdError::ConfigError(format!("[exec].timeout {e}")))
}

/// A timeout must be non-zero and at most [`MAX_TIMEOUT`].
pub fn check_timeout(timeout: Duration) -> std::result::Result<Duration, String> {
    if timeout.is_zero() {
        return Err("must be greater than zero".to_string());
    }
    if timeout > MAX_TIMEOUT {
        return Err(format!(
            "must be at most {}h (got {timeout:?})",
            MAX_TIMEOUT.as_secs() / 3600
        ));
    }
    Ok(timeout)
}

fn validate_shell(cfg: &RawConfigFile) -> Result<()> {
    if let Some(shell) = &cfg.exec.shell
        && shell.trim().is_empty()
    {
        return Err(QuickCmdError::ConfigError(
            "[exec].shell must not be empty when set".to_string(),
        ));
    }

    if cfg.exec.shell.is_none() && cfg.exec.shell_args.is_some() {
        return Err(QuickCmdError::ConfigError(
            "[exec].shell_args requires [exec].shell".to_string(),
        ));
    }
    Ok(())
}

fn validate_catalog(cfg: &RawConfigFile) -> Result<()> {
    if cfg.catalog.path.trim().is_empty() {
        return Err(QuickCmdError::ConfigError(
            "[catalog].path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_session(cfg: &RawConfigFile) -> Result<()> {
    if cfg.session.event_buffer == 0 {
        return Err(QuickCmdError::ConfigError(
            "[session].event_buffer must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
