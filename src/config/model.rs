// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::config::validate::check_timeout;
use crate::errors::QuickCmdError;
use crate::exec::{ExecOptions, ShellSpec, DEFAULT_NO_OUTPUT_NOTICE};
use crate::session::SessionOptions;
use crate::types::TextEncoding;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [exec]
/// timeout = "30s"
/// encoding = "auto"
/// shell = "bash"
/// shell_args = ["-c"]
///
/// [catalog]
/// path = "custom_commands.json"
///
/// [session]
/// event_buffer = 256
/// cancel_superseded = false
/// strict_variables = false
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub catalog: CatalogSection,

    #[serde(default)]
    pub session: SessionSection,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// the accessors can rely on every value being usable.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub exec: ExecSection,
    pub catalog: CatalogSection,
    pub session: SessionSection,
    timeout: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        exec: ExecSection,
        catalog: CatalogSection,
        session: SessionSection,
        timeout: Duration,
    ) -> Self {
        Self {
            exec,
            catalog,
            session,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the timeout, applying the same bounds as `[exec].timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> crate::errors::Result<Self> {
        self.timeout = check_timeout(timeout)
            .map_err(|e| QuickCmdError::ConfigError(format!("timeout {e}")))?;
        Ok(self)
    }

    pub fn with_catalog_path(mut self, path: impl Into<String>) -> Self {
        self.catalog.path = path.into();
        self
    }

    pub fn catalog_path(&self) -> PathBuf {
        PathBuf::from(&self.catalog.path)
    }

    pub fn exec_options(&self) -> ExecOptions {
        let shell = match &self.exec.shell {
            Some(program) => {
                let args = self
                    .exec
                    .shell_args
                    .clone()
                    .unwrap_or_else(|| ShellSpec::platform_default().args);
                ShellSpec::new(program.clone(), args)
            }
            None => ShellSpec::platform_default(),
        };

        ExecOptions {
            timeout: self.timeout,
            encoding: self.exec.encoding,
            shell,
            event_buffer: self.session.event_buffer,
            no_output_notice: self
                .exec
                .no_output_notice
                .clone()
                .unwrap_or_else(|| DEFAULT_NO_OUTPUT_NOTICE.to_string()),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            event_buffer: self.session.event_buffer,
            cancel_superseded: self.session.cancel_superseded,
            strict_variables: self.session.strict_variables,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ExecSection::default(),
            CatalogSection::default(),
            SessionSection::default(),
            crate::exec::DEFAULT_TIMEOUT,
        )
    }
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecSection {
    /// Wall-clock limit per command, e.g. `"30s"`, `"500ms"`, `"2m"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// `"auto"` or a WHATWG label (`"utf-8"`, `"gbk"`, ...).
    #[serde(default)]
    pub encoding: TextEncoding,

    /// Shell program overriding the platform default.
    #[serde(default)]
    pub shell: Option<String>,

    /// Arguments placed before the command string. Only used with `shell`;
    /// defaults to the platform's (`-c` or `/C`).
    #[serde(default)]
    pub shell_args: Option<Vec<String>>,

    /// Text of the line shown when a successful command printed nothing.
    #[serde(default)]
    pub no_output_notice: Option<String>,
}

fn default_timeout() -> String {
    "30s".to_string()
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            encoding: TextEncoding::Auto,
            shell: None,
            shell_args: None,
            no_output_notice: None,
        }
    }
}

/// `[catalog]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSection {
    /// Location of the custom command file, relative to the working
    /// directory unless absolute.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    "custom_commands.json".to_string()
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    pub cancel_superseded: bool,

    #[serde(default)]
    pub strict_variables: bool,
}

fn default_event_buffer() -> usize {
    256
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            cancel_superseded: false,
            strict_variables: false,
        }
    }
}
