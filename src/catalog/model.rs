// src/catalog/model.rs

use serde::{Deserialize, Serialize};

/// A named, reusable command template.
///
/// The JSON layout matches the launcher's `custom_commands.json`:
///
/// ```json
/// [
///   {
///     "name": "Ping host",
///     "command": "ping {flag} {count} {host}",
///     "variables": [
///       { "name": "host", "description": "Target host", "default": "example.com" }
///     ]
///   }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDef {
    /// Display identifier, unique within the catalog.
    pub name: String,

    /// Raw command string, may contain `{variable}` placeholders.
    #[serde(rename = "command")]
    pub template: String,

    /// Variables in prompt order.
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
}

impl CommandDef {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            variables: Vec::new(),
        }
    }

    pub fn with_variable(mut self, var: VariableSpec) -> Self {
        self.variables.push(var);
        self
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }
}

/// One `{name}` placeholder a command expects a value for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,

    /// Display-only hint shown when prompting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fallback used when no (or an empty) value is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl VariableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: None,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The default, ignoring empty strings (older catalogs store `""` for
    /// "no default").
    pub fn effective_default(&self) -> Option<&str> {
        self.default.as_deref().filter(|d| !d.is_empty())
    }

    pub fn effective_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_layout_with_empty_strings() {
        let json = r#"[{
            "name": "查看端口",
            "command": "netstat -an | grep {port}",
            "variables": [{"name": "port", "description": "", "default": ""}]
        }]"#;

        let defs: Vec<CommandDef> = serde_json::from_str(json).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].template, "netstat -an | grep {port}");
        let var = &defs[0].variables[0];
        assert_eq!(var.effective_default(), None);
        assert_eq!(var.effective_description(), None);
    }

    #[test]
    fn missing_variables_key_means_none() {
        let def: CommandDef = serde_json::from_str(r#"{"name":"ls","command":"ls -la"}"#).unwrap();
        assert!(!def.has_variables());
    }
}
