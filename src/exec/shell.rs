// src/exec/shell.rs

use tokio::process::Command;

/// The interpreter a command string is handed to.
///
/// Commands are shell pipelines (`|`, `&&`, redirections), so they are never
/// exec'd directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ShellSpec {
    /// `cmd /C` on Windows, `sh -c` elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::new("cmd", ["/C"])
        } else {
            Self::new("sh", ["-c"])
        }
    }

    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build (but do not spawn) the process for `command_line`.
    pub fn command_for(&self, command_line: &str) -> Command {
        let mut c = Command::new(&self.program);
        c.args(&self.args).arg(command_line);
        c
    }
}

impl Default for ShellSpec {
    fn default() -> Self {
        Self::platform_default()
    }
}
