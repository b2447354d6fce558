// src/config/mod.rs

//! Configuration loading and validation for quickcmd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values like the timeout and buffer sizes (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{CatalogSection, ConfigFile, ExecSection, RawConfigFile, SessionSection};
pub use validate::{check_timeout, validate_config};
