// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod console;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod session;
pub mod template;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::catalog::{presets, CatalogService, CommandDef, JsonFileCatalog, VariableSpec};
use crate::cli::{CliArgs, Command};
use crate::config::{load_or_default, ConfigFile};
use crate::console::{exit_code_for, ConsolePort, PromptResolver};
use crate::errors::QuickCmdError;
use crate::exec::{ExecutionRequest, RealExecutorBackend};
use crate::session::{RelayHandle, SessionManager, UiPort};
use crate::template::{DefaultsResolver, VariableResolver, VariableValues};
use crate::types::{parse_duration, Platform};

/// The terminal shows a single output pane.
const CONSOLE_SLOT: &str = "console";

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code: 0 on success, the child's code on a
/// non-zero exit, 124 on timeout, 130 on cancellation and 1 otherwise.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_config(&args)?;
    debug!(?cfg, "configuration loaded");

    match args.command {
        Command::List { platform } => {
            list(&cfg, platform.unwrap_or_else(Platform::current));
            Ok(0)
        }
        Command::Run {
            name,
            vars,
            no_prompt,
        } => run_named(&cfg, &name, vars.into_iter().collect(), no_prompt).await,
        Command::Exec { command } => {
            let request = ExecutionRequest::new("exec", cli::exec_command_line(&command));
            execute(&cfg, |manager, port| {
                Ok(manager.request_run_raw(CONSOLE_SLOT, request, port))
            })
            .await
        }
        Command::Add {
            name,
            command,
            variables,
            descriptions,
        } => {
            let mut def = CommandDef::new(name, command);
            def.variables = describe(variables, descriptions)?;

            let mut catalog = open_catalog(&cfg);
            catalog.add(def)?;
            Ok(0)
        }
        Command::Edit {
            name,
            rename,
            command,
            variables,
            descriptions,
            clear_variables,
        } => {
            let mut catalog = open_catalog(&cfg);
            let index = catalog
                .position(&name)
                .ok_or_else(|| QuickCmdError::CommandNotFound(name.clone()))?;
            let mut def = catalog.snapshot()[index].clone();

            if let Some(rename) = rename {
                def.name = rename;
            }
            if let Some(command) = command {
                def.template = command;
            }
            if clear_variables {
                def.variables.clear();
            } else if !variables.is_empty() {
                def.variables = variables;
            }
            def.variables = describe(def.variables, descriptions)?;

            catalog.edit(index, def)?;
            Ok(0)
        }
        Command::Delete { name } => {
            let mut catalog = open_catalog(&cfg);
            let index = catalog
                .position(&name)
                .ok_or_else(|| QuickCmdError::CommandNotFound(name.clone()))?;
            catalog.delete(index)?;
            Ok(0)
        }
    }
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = load_or_default(&args.config)
        .with_context(|| format!("loading config {:?}", args.config))?;

    if let Some(raw) = &args.timeout {
        let timeout = parse_duration(raw).map_err(QuickCmdError::ConfigError)?;
        cfg = cfg.with_timeout(timeout)?;
    }
    if let Some(path) = &args.catalog {
        cfg = cfg.with_catalog_path(path.clone());
    }

    Ok(cfg)
}

fn open_catalog(cfg: &ConfigFile) -> CatalogService {
    CatalogService::open(JsonFileCatalog::new(cfg.catalog_path()))
}

/// Attach `NAME=TEXT` descriptions to the matching variables.
fn describe(
    mut variables: Vec<VariableSpec>,
    descriptions: Vec<(String, String)>,
) -> Result<Vec<VariableSpec>> {
    for (name, text) in descriptions {
        let var = variables
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| {
                QuickCmdError::CatalogError(format!("--describe names unknown variable '{name}'"))
            })?;
        var.description = Some(text);
    }
    Ok(variables)
}

fn list(cfg: &ConfigFile, platform: Platform) {
    for group in presets::for_platform(platform) {
        println!("{}:", group.title);
        for def in group.commands.iter() {
            println!("  {:<20} {}", def.name, def.template);
        }
        println!();
    }

    let catalog = open_catalog(cfg);
    println!("Custom commands ({}):", catalog.len());
    for def in catalog.snapshot().iter() {
        println!("  {:<20} {}", def.name, def.template);
        for var in def.variables.iter() {
            let default = var.effective_default().unwrap_or("");
            let desc = var.effective_description().unwrap_or("");
            println!("      {{{}}} default={default:?} {desc}", var.name);
        }
    }
}

async fn run_named(
    cfg: &ConfigFile,
    name: &str,
    provided: VariableValues,
    no_prompt: bool,
) -> Result<i32> {
    let def = match open_catalog(cfg).find(name) {
        Some(def) => def.clone(),
        None => presets::find(Platform::current(), name)
            .ok_or_else(|| QuickCmdError::CommandNotFound(name.to_string()))?,
    };

    let values = if def.has_variables() && !no_prompt {
        let prompt_def = def.clone();
        tokio::task::spawn_blocking(move || {
            PromptResolver::stdio(provided).resolve(&prompt_def)
        })
        .await
        .context("variable prompt failed")?
    } else {
        DefaultsResolver::new(provided).resolve(&def)
    };

    let Some(values) = values else {
        info!(name = %def.name, "variable input aborted; not running");
        eprintln!("Cancelled.");
        return Ok(130);
    };

    execute(cfg, |manager, port| {
        Ok(manager.request_run(CONSOLE_SLOT, &def, &values, port)?)
    })
    .await
}

/// Start one session on the console and wait for it, cancelling on Ctrl-C.
async fn execute<F>(cfg: &ConfigFile, start: F) -> Result<i32>
where
    F: FnOnce(&SessionManager<RealExecutorBackend>, Arc<dyn UiPort>) -> Result<RelayHandle>,
{
    let manager = SessionManager::new(
        RealExecutorBackend::new(cfg.exec_options()),
        cfg.session_options(),
    );
    let port: Arc<dyn UiPort> = Arc::new(ConsolePort::stdio());

    let relay = start(&manager, port)?;
    let session = relay.session();
    let wait = relay.wait();
    tokio::pin!(wait);

    let result = loop {
        tokio::select! {
            result = &mut wait => break result,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    info!(%session, "Ctrl-C received; cancelling");
                    manager.request_cancel(session);
                }
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                    break (&mut wait).await;
                }
            },
        }
    };

    Ok(exit_code_for(result.as_ref()))
}
