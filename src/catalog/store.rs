// src/catalog/store.rs

//! Persistence of the custom command list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::model::CommandDef;
use crate::errors::{QuickCmdError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// Storage seam for the catalog.
///
/// `load` never fails: a missing or unreadable store is an empty catalog.
/// `save` reports failures so the caller can tell the user.
pub trait CommandCatalog: Send + Sync {
    fn load(&self) -> Vec<CommandDef>;
    fn save(&self, commands: &[CommandDef]) -> Result<()>;
}

/// Catalog stored as a pretty-printed UTF-8 JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, Arc::new(RealFileSystem))
    }

    pub fn with_fs(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandCatalog for JsonFileCatalog {
    fn load(&self) -> Vec<CommandDef> {
        if !self.fs.exists(&self.path) {
            debug!(path = ?self.path, "catalog file absent; starting empty");
            return Vec::new();
        }

        let contents = match self.fs.read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "catalog unreadable; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CommandDef>>(&contents) {
            Ok(commands) => {
                debug!(path = ?self.path, count = commands.len(), "catalog loaded");
                commands
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "catalog malformed; starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, commands: &[CommandDef]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(commands)?;
        json.push('\n');

        self.fs
            .write_atomic(&self.path, json.as_bytes())
            .map_err(|e| QuickCmdError::SaveError(format!("{:?}: {e:#}", self.path)))?;

        debug!(path = ?self.path, count = commands.len(), "catalog saved");
        Ok(())
    }
}
