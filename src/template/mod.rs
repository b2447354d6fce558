// src/template/mod.rs

//! `{name}` placeholder substitution for command templates.
//!
//! Resolution is deliberately simple:
//! - every `{name}` whose `name` has a value is replaced, all occurrences;
//! - placeholders without a value are left verbatim (see [`resolve_strict`]
//!   for the fail-closed variant);
//! - substituted values are never re-expanded;
//! - there is no escape syntax for literal braces.

pub mod variables;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{QuickCmdError, Result};

pub use variables::{effective_values, DefaultsResolver, VariableResolver};

/// Variable name -> value.
pub type VariableValues = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder regex is valid"));

/// Substitute `values` into `template`.
///
/// Single left-to-right pass, so a value containing `{other}` is inserted
/// literally even when `other` also has a value.
pub fn resolve(template: &str, values: &VariableValues) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Like [`resolve`], but fails if any placeholder is left without a value.
pub fn resolve_strict(template: &str, values: &VariableValues) -> Result<String> {
    let missing = unresolved(template, values);
    if !missing.is_empty() {
        return Err(QuickCmdError::UnresolvedVariables(missing));
    }
    Ok(resolve(template, values))
}

/// Distinct placeholder names in order of first appearance.
///
/// Brace groups containing whitespace (`awk '{ print $1 }'`) are shell
/// syntax, not placeholders, and are skipped.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if name.chars().any(char::is_whitespace) {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Placeholders in `template` that `values` has no entry for.
pub fn unresolved(template: &str, values: &VariableValues) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect()
}
