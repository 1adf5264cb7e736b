//! Validation of targets, build parameters and project settings.
//!
//! Producers validate their parameters before building anything, so malformed
//! input fails with a descriptive error instead of a partially-built
//! configuration.

use std::collections::HashSet;

use crate::error::{ConfigError, Result};
use crate::params::ConfigurationParams;
use crate::settings::ProjectSettings;
use crate::target::Target;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for Target {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_params("target.name", "cannot be empty"));
        }

        if self.src_folder.as_os_str().is_empty() {
            return Err(ConfigError::invalid_params(
                "target.src_folder",
                format!("cannot be empty (target '{}')", self.name),
            ));
        }

        if self.build_folder.as_os_str().is_empty() {
            return Err(ConfigError::invalid_params(
                "target.build_folder",
                format!("cannot be empty (target '{}')", self.name),
            ));
        }

        if let Some(server) = &self.dev_server {
            if server.port == 0 {
                return Err(ConfigError::invalid_params(
                    "target.dev_server.port",
                    format!("must be non-zero (target '{}')", self.name),
                ));
            }
        }

        for module in self.include_modules.iter().chain(&self.exclude_modules) {
            if module.trim().is_empty() {
                return Err(ConfigError::invalid_params(
                    "target.include_modules",
                    "module names cannot be empty",
                ));
            }
        }

        Ok(())
    }
}

impl Validate for ConfigurationParams {
    fn validate(&self) -> Result<()> {
        self.target.validate()?;

        if self.entry.is_empty() {
            return Err(ConfigError::invalid_params(
                "entry",
                format!("target '{}' declares no entry points", self.target.name),
            ));
        }

        for (name, modules) in &self.entry {
            if modules.is_empty() {
                return Err(ConfigError::invalid_params(
                    format!("entry.{name}"),
                    "lists no modules",
                ));
            }
        }

        if self.output.script.trim().is_empty() {
            return Err(ConfigError::invalid_params(
                "output.script",
                "filename template cannot be empty",
            ));
        }

        Ok(())
    }
}

impl Validate for ProjectSettings {
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (key, target) in &self.targets {
            target.validate()?;
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("targets.{key}.name"),
                    hint: Some(format!("target name '{}' is used twice", target.name)),
                });
            }
        }
        Ok(())
    }
}
