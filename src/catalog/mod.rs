// src/catalog/mod.rs

//! The persisted collection of user-defined commands, plus the built-in
//! presets.
//!
//! - [`model`]: `CommandDef` / `VariableSpec`.
//! - [`store`]: the `CommandCatalog` storage seam and its JSON file backend.
//! - [`service`]: `CatalogService`, the single owner that validates and
//!   persists add/edit/delete.
//! - [`presets`]: read-only per-platform command groups.

pub mod model;
pub mod presets;
pub mod service;
pub mod store;

pub use model::{CommandDef, VariableSpec};
pub use presets::PresetGroup;
pub use service::CatalogService;
pub use store::{CommandCatalog, JsonFileCatalog};
