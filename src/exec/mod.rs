// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs one resolved command string per invocation using
//! `tokio::process::Command` behind the platform shell, and reports back
//! through an ordered stream of [`ExecutionEvent`]s that always ends with
//! exactly one [`ExecutionEvent::Finished`].
//!
//! - [`shell`] builds the shell invocation for the platform.
//! - [`drain`] reads one output pipe line by line and decodes it.
//! - [`supervisor`] owns the lifecycle of a child: spawn, concurrent
//!   draining, timeout, cancellation, terminal result.
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` used in production, which tests can replace with a
//!   scripted fake.

use std::fmt;
use std::time::Duration;

use crate::types::TextEncoding;

pub mod backend;
pub mod drain;
pub mod process_tree;
pub mod shell;
pub mod supervisor;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use shell::ShellSpec;
pub use supervisor::{start, CancelHandle, CancelSignal, SupervisorHandle};

/// Default wall-clock limit for one invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest timeout the configuration accepts.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default text of the line emitted when a successful command printed
/// nothing at all.
pub const DEFAULT_NO_OUTPUT_NOTICE: &str = "command completed with no output";

/// A resolved command string plus the display name it was started under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub name: String,
    pub command: String,
}

impl ExecutionRequest {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

/// Where an output line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
    /// Generated by the supervisor itself, not read from the child.
    Notice,
}

/// One decoded line of output, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: StreamSource,
    pub text: String,
}

impl OutputLine {
    pub fn new(source: StreamSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Exit code 0.
    Success,
    /// Non-zero exit code (or killed by a signal).
    Failure,
    /// Wall-clock limit hit; the child was killed.
    Timeout,
    /// Cancelled by the caller; the child was killed.
    Cancelled,
    /// The shell could not be started, or waiting on it failed.
    Error,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failure => "failure",
            ExecutionStatus::Timeout => "timeout",
            ExecutionStatus::Cancelled => "cancelled",
            ExecutionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Terminal outcome of one invocation.
///
/// `exit_code` is set only for `Success`/`Failure`, and is `None` for a
/// failure caused by a signal. `message` is set only for the other statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub exit_code: Option<i32>,
    pub message: Option<String>,
}

impl ExecutionResult {
    /// `Success` for 0, `Failure` otherwise.
    pub fn exited(code: i32) -> Self {
        let status = if code == 0 {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure
        };
        Self {
            status,
            exit_code: Some(code),
            message: None,
        }
    }

    /// `Failure` without a code: the shell was killed by a signal.
    pub fn signalled() -> Self {
        Self {
            status: ExecutionStatus::Failure,
            exit_code: None,
            message: None,
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            status: ExecutionStatus::Timeout,
            exit_code: None,
            message: Some(format!("command timed out after {limit:?}")),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: ExecutionStatus::Cancelled,
            exit_code: None,
            message: Some("command cancelled".to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Error,
            exit_code: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// What a running invocation reports, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    Line(OutputLine),
    /// Always the last event of an invocation.
    Finished(ExecutionResult),
}

/// Knobs for the process supervisor.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Measured from spawn.
    pub timeout: Duration,
    pub encoding: TextEncoding,
    pub shell: ShellSpec,
    /// Capacity of each invocation's event channel.
    pub event_buffer: usize,
    pub no_output_notice: String,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            encoding: TextEncoding::Auto,
            shell: ShellSpec::platform_default(),
            event_buffer: 256,
            no_output_notice: DEFAULT_NO_OUTPUT_NOTICE.to_string(),
        }
    }
}
