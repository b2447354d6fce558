// src/console.rs

//! Terminal presentation: the `UiPort` used by the binary and the
//! interactive variable prompt.

use std::io::{self, BufRead, Write};
use std::sync::{Mutex, PoisonError};

use chrono::Local;

use crate::catalog::CommandDef;
use crate::exec::{ExecutionRequest, ExecutionResult, ExecutionStatus, OutputLine, StreamSource};
use crate::session::{SessionId, UiPort};
use crate::template::{effective_values, VariableResolver, VariableValues};

const RULE: &str = "============================================================";

/// Writes session output to the terminal: stdout lines (and notices) to
/// one writer, stderr lines to another.
pub struct ConsolePort {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl ConsolePort {
    pub fn stdio() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    // Write errors (e.g. a closed pipe) are ignored; output is best effort.
    fn write_out(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }

    fn write_err(&self, text: &str) {
        let mut err = self.err.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(err, "{text}");
        let _ = err.flush();
    }
}

impl UiPort for ConsolePort {
    fn on_start(&self, _session: SessionId, request: &ExecutionRequest) {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.write_out(&format!(
            "{RULE}\nRunning: {}\nCommand: {}\nTime:    {now}\n{RULE}",
            request.name, request.command
        ));
    }

    fn on_line(&self, _session: SessionId, line: &OutputLine) {
        match line.source {
            StreamSource::Stdout | StreamSource::Notice => self.write_out(&line.text),
            StreamSource::Stderr => self.write_err(&line.text),
        }
    }

    fn on_result(&self, _session: SessionId, result: &ExecutionResult) {
        self.write_out(&format!("\n{}", summarize(result)));
    }
}

/// One-line human summary of a terminal result.
pub fn summarize(result: &ExecutionResult) -> String {
    match result.status {
        ExecutionStatus::Success => "Command completed successfully".to_string(),
        ExecutionStatus::Failure => match (&result.message, result.exit_code) {
            (Some(msg), _) => format!("Command failed: {msg}"),
            (None, Some(code)) => format!("Command failed with exit code {code}"),
            (None, None) => "Command failed".to_string(),
        },
        _ => {
            let label = match result.status {
                ExecutionStatus::Timeout => "Command timed out",
                ExecutionStatus::Cancelled => "Command cancelled",
                _ => "Command could not be run",
            };
            match &result.message {
                Some(msg) => format!("{label}: {msg}"),
                None => label.to_string(),
            }
        }
    }
}

/// Process exit code for the binary given a session's terminal result.
pub fn exit_code_for(result: Option<&ExecutionResult>) -> i32 {
    let Some(result) = result else {
        return 1;
    };
    match result.status {
        ExecutionStatus::Success => 0,
        ExecutionStatus::Failure => match result.exit_code {
            Some(code) if (1..=255).contains(&code) => code,
            _ => 1,
        },
        ExecutionStatus::Timeout => 124,
        ExecutionStatus::Cancelled => 130,
        ExecutionStatus::Error => 1,
    }
}

/// Asks for each variable on a terminal.
///
/// Values already supplied (non-empty) are not asked for. An empty answer
/// takes the variable's default; end of input cancels.
pub struct PromptResolver<R, W> {
    input: R,
    output: W,
    provided: VariableValues,
}

impl PromptResolver<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr so stdout stays clean for command output.
    pub fn stdio(provided: VariableValues) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), provided)
    }
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W, provided: VariableValues) -> Self {
        Self {
            input,
            output,
            provided,
        }
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{prompt}");
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl<R: BufRead, W: Write> VariableResolver for PromptResolver<R, W> {
    fn resolve(&mut self, def: &CommandDef) -> Option<VariableValues> {
        let mut answers = self.provided.clone();

        for var in def.variables.iter() {
            let given = answers.get(&var.name).is_some_and(|v| !v.is_empty());
            if given {
                continue;
            }

            if let Some(desc) = var.effective_description() {
                let _ = writeln!(self.output, "{desc}");
            }
            let prompt = match var.effective_default() {
                Some(default) => format!("{} [{default}]: ", var.name),
                None => format!("{}: ", var.name),
            };

            let answer = self.ask(&prompt)?;
            answers.insert(var.name.clone(), answer);
        }

        Some(effective_values(def, &answers))
    }
}
