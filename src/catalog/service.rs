// src/catalog/service.rs

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::catalog::model::CommandDef;
use crate::catalog::store::CommandCatalog;
use crate::errors::{QuickCmdError, Result};

/// Single owner of the custom command list.
///
/// Mutations take `&mut self` and persist before the in-memory list is
/// replaced, so a failed save leaves both the file and the list untouched.
/// Readers take an [`Arc`] snapshot which stays valid (and unchanged) across
/// later edits.
pub struct CatalogService {
    store: Box<dyn CommandCatalog>,
    commands: Arc<Vec<CommandDef>>,
}

impl CatalogService {
    /// Load the catalog from `store`. Never fails; see [`CommandCatalog::load`].
    pub fn open(store: impl CommandCatalog + 'static) -> Self {
        let commands = store.load();
        Self {
            store: Box::new(store),
            commands: Arc::new(commands),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<CommandDef>> {
        Arc::clone(&self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CommandDef> {
        self.commands.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn add(&mut self, def: CommandDef) -> Result<()> {
        validate_command(&def, &self.commands, None)?;

        let mut next = self.commands.as_ref().clone();
        info!(name = %def.name, "adding custom command");
        next.push(def);
        self.commit(next)
    }

    pub fn edit(&mut self, index: usize, def: CommandDef) -> Result<()> {
        self.check_index(index)?;
        validate_command(&def, &self.commands, Some(index))?;

        let mut next = self.commands.as_ref().clone();
        info!(index, name = %def.name, "updating custom command");
        next[index] = def;
        self.commit(next)
    }

    pub fn delete(&mut self, index: usize) -> Result<CommandDef> {
        self.check_index(index)?;

        let mut next = self.commands.as_ref().clone();
        let removed = next.remove(index);
        info!(index, name = %removed.name, "deleting custom command");
        self.commit(next)?;
        Ok(removed)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.commands.len() {
            return Err(QuickCmdError::CatalogError(format!(
                "no custom command at index {index} (catalog has {})",
                self.commands.len()
            )));
        }
        Ok(())
    }

    fn commit(&mut self, next: Vec<CommandDef>) -> Result<()> {
        self.store.save(&next)?;
        self.commands = Arc::new(next);
        Ok(())
    }
}

/// Check a definition before it enters the catalog.
///
/// `replacing` is the index being edited; that entry may keep its own name.
pub fn validate_command(
    def: &CommandDef,
    existing: &[CommandDef],
    replacing: Option<usize>,
) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(QuickCmdError::CatalogError(
            "command name must not be empty".to_string(),
        ));
    }
    if def.template.trim().is_empty() {
        return Err(QuickCmdError::CatalogError(format!(
            "command '{}' has an empty command string",
            def.name
        )));
    }

    let clash = existing
        .iter()
        .enumerate()
        .any(|(i, c)| Some(i) != replacing && c.name == def.name);
    if clash {
        return Err(QuickCmdError::CatalogError(format!(
            "a custom command named '{}' already exists",
            def.name
        )));
    }

    let mut seen = HashSet::new();
    for var in def.variables.iter() {
        if var.name.trim().is_empty() {
            return Err(QuickCmdError::CatalogError(format!(
                "command '{}' has a variable with an empty name",
                def.name
            )));
        }
        if !seen.insert(var.name.as_str()) {
            return Err(QuickCmdError::CatalogError(format!(
                "command '{}' declares variable '{}' twice",
                def.name, var.name
            )));
        }
    }

    Ok(())
}
