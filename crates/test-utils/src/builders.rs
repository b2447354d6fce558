#![allow(dead_code)]

use quickcmd::catalog::{CommandDef, VariableSpec};
use quickcmd::config::{ConfigFile, RawConfigFile};
use quickcmd::template::VariableValues;
use quickcmd::types::TextEncoding;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.exec.timeout = timeout.to_string();
        self
    }

    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.exec.encoding = encoding;
        self
    }

    pub fn shell(mut self, program: &str, args: &[&str]) -> Self {
        self.config.exec.shell = Some(program.to_string());
        self.config.exec.shell_args = Some(args.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn catalog_path(mut self, path: &str) -> Self {
        self.config.catalog.path = path.to_string();
        self
    }

    pub fn strict_variables(mut self, val: bool) -> Self {
        self.config.session.strict_variables = val;
        self
    }

    pub fn cancel_superseded(mut self, val: bool) -> Self {
        self.config.session.cancel_superseded = val;
        self
    }

    pub fn event_buffer(mut self, size: usize) -> Self {
        self.config.session.event_buffer = size;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CommandDef`.
pub struct CommandDefBuilder {
    def: CommandDef,
}

impl CommandDefBuilder {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            def: CommandDef::new(name, template),
        }
    }

    pub fn var(mut self, name: &str) -> Self {
        self.def.variables.push(VariableSpec::new(name));
        self
    }

    pub fn var_with_default(mut self, name: &str, default: &str) -> Self {
        self.def
            .variables
            .push(VariableSpec::new(name).default_value(default));
        self
    }

    pub fn build(self) -> CommandDef {
        self.def
    }
}

/// `VariableValues` from literal pairs.
pub fn values(pairs: &[(&str, &str)]) -> VariableValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
