// src/template/variables.rs

use crate::catalog::CommandDef;
use crate::template::VariableValues;

/// Supplies variable values for a command before it runs.
///
/// Returning `None` means the user backed out; the command must not run.
pub trait VariableResolver {
    fn resolve(&mut self, def: &CommandDef) -> Option<VariableValues>;
}

/// Merge caller-provided values with each variable's default.
///
/// For every declared variable, in order: a non-empty provided value wins,
/// then a non-empty default. Variables with neither are left out, so the
/// template keeps their placeholder. Provided values for names the command
/// does not declare are passed through unchanged.
pub fn effective_values(def: &CommandDef, provided: &VariableValues) -> VariableValues {
    let mut values = provided.clone();

    for var in def.variables.iter() {
        let given = provided
            .get(&var.name)
            .map(String::as_str)
            .filter(|v| !v.is_empty());

        match given.or(var.effective_default()) {
            Some(value) => {
                values.insert(var.name.clone(), value.to_string());
            }
            None => {
                values.remove(&var.name);
            }
        }
    }

    values
}

/// Non-interactive resolver: fixed overrides plus declared defaults.
#[derive(Debug, Clone, Default)]
pub struct DefaultsResolver {
    overrides: VariableValues,
}

impl DefaultsResolver {
    pub fn new(overrides: VariableValues) -> Self {
        Self { overrides }
    }
}

impl VariableResolver for DefaultsResolver {
    fn resolve(&mut self, def: &CommandDef) -> Option<VariableValues> {
        Some(effective_values(def, &self.overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VariableSpec;

    fn ping() -> CommandDef {
        CommandDef::new("ping", "ping {flag} {count} {host}")
            .with_variable(VariableSpec::new("flag").default_value("-c"))
            .with_variable(VariableSpec::new("count").default_value("4"))
            .with_variable(VariableSpec::new("host").default_value(""))
    }

    #[test]
    fn empty_answer_falls_back_to_default() {
        let mut provided = VariableValues::new();
        provided.insert("count".into(), "".into());
        provided.insert("host".into(), "example.com".into());

        let values = effective_values(&ping(), &provided);

        assert_eq!(values.get("flag").map(String::as_str), Some("-c"));
        assert_eq!(values.get("count").map(String::as_str), Some("4"));
        assert_eq!(values.get("host").map(String::as_str), Some("example.com"));
    }

    #[test]
    fn variable_without_value_or_default_is_absent() {
        let values = effective_values(&ping(), &VariableValues::new());
        assert!(!values.contains_key("host"));
    }

    #[test]
    fn defaults_resolver_never_cancels() {
        let mut resolver = DefaultsResolver::default();
        let values = resolver.resolve(&ping()).expect("defaults resolver always answers");
        assert_eq!(values.len(), 2);
    }
}
