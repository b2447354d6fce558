// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Failures of a single command invocation (spawn failure, timeout, non-zero
//! exit) are *not* represented here: they are reported as terminal
//! [`ExecutionResult`](crate::exec::ExecutionResult)s.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuickCmdError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Failed to save catalog: {0}")]
    SaveError(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Unresolved template variables: {}", .0.join(", "))]
    UnresolvedVariables(Vec<String>),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, QuickCmdError>;
