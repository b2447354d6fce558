// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::catalog::VariableSpec;
use crate::types::Platform;

/// Command-line arguments for `quickcmd`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "quickcmd",
    version,
    about = "Run built-in and custom shell commands with live output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). A missing file means defaults.
    #[arg(long, value_name = "PATH", default_value = "QuickCmd.toml", global = true)]
    pub config: String,

    /// Custom command file, overriding `[catalog].path`.
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<String>,

    /// Per-command time limit (e.g. "10s", "2m"), overriding `[exec].timeout`.
    #[arg(long, value_name = "DURATION", global = true)]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `QUICKCMD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show built-in and custom commands.
    List {
        /// Show the built-ins of another platform.
        #[arg(long, value_enum)]
        platform: Option<Platform>,
    },

    /// Run a custom command (or a built-in one) by name.
    Run {
        name: String,

        /// Variable value; may be repeated. Variables not given here are
        /// prompted for.
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_key_value)]
        vars: Vec<(String, String)>,

        /// Never prompt; use defaults for variables not given with --var.
        #[arg(long)]
        no_prompt: bool,
    },

    /// Run a raw command string through the shell.
    ///
    /// Pass the command as one quoted argument to keep it exactly as
    /// written. Several arguments are joined with single spaces, so quoting
    /// already removed by the invoking shell is not restored.
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Add a custom command.
    Add {
        #[arg(long)]
        name: String,

        /// Command template; `{name}` marks a variable.
        #[arg(long)]
        command: String,

        #[arg(long = "variable", value_name = "NAME[=DEFAULT]", value_parser = parse_variable)]
        variables: Vec<VariableSpec>,

        /// Description shown when prompting for a variable.
        #[arg(long = "describe", value_name = "NAME=TEXT", value_parser = parse_key_value)]
        descriptions: Vec<(String, String)>,
    },

    /// Change an existing custom command.
    Edit {
        name: String,

        #[arg(long)]
        rename: Option<String>,

        #[arg(long)]
        command: Option<String>,

        /// Replaces the whole variable list.
        #[arg(long = "variable", value_name = "NAME[=DEFAULT]", value_parser = parse_variable)]
        variables: Vec<VariableSpec>,

        #[arg(long = "describe", value_name = "NAME=TEXT", value_parser = parse_key_value)]
        descriptions: Vec<(String, String)>,

        /// Remove all variables.
        #[arg(long, conflicts_with = "variables")]
        clear_variables: bool,
    },

    /// Delete a custom command.
    Delete { name: String },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

fn parse_variable(s: &str) -> Result<VariableSpec, String> {
    let (name, default) = match s.split_once('=') {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (s.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("variable name missing in '{s}'"));
    }

    let mut spec = VariableSpec::new(name);
    if let Some(default) = default {
        spec = spec.default_value(default);
    }
    Ok(spec)
}

/// The shell command line for `exec` arguments (see [`Command::Exec`]).
pub fn exec_command_line(parts: &[String]) -> String {
    match parts {
        [single] => single.clone(),
        _ => parts.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_keeps_equals_signs_in_value() {
        assert_eq!(
            parse_key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn variable_with_and_without_default() {
        assert_eq!(parse_variable("host").unwrap(), VariableSpec::new("host"));
        assert_eq!(
            parse_variable("count=4").unwrap(),
            VariableSpec::new("count").default_value("4")
        );
        assert!(parse_variable("=4").is_err());
    }

    #[test]
    fn parses_run_with_vars() {
        let args = CliArgs::try_parse_from([
            "quickcmd", "--timeout", "5s", "run", "ping", "--var", "host=example.com", "--no-prompt",
        ])
        .unwrap();

        assert_eq!(args.timeout.as_deref(), Some("5s"));
        match args.command {
            Command::Run { name, vars, no_prompt } => {
                assert_eq!(name, "ping");
                assert_eq!(vars, vec![("host".to_string(), "example.com".to_string())]);
                assert!(no_prompt);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn exec_takes_the_rest_of_the_line() {
        let args = CliArgs::try_parse_from(["quickcmd", "exec", "ls", "-la", "|", "head"]).unwrap();
        match args.command {
            Command::Exec { command } => assert_eq!(exec_command_line(&command), "ls -la | head"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn quoted_exec_command_is_kept_verbatim() {
        let line = "printf '%s\\n' \"a  b\" | grep -c 'a  b'";
        let args = CliArgs::try_parse_from(["quickcmd", "exec", line]).unwrap();
        match args.command {
            Command::Exec { command } => assert_eq!(exec_command_line(&command), line),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
