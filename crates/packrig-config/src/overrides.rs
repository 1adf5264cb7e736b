//! User override files.
//!
//! An override file is an optional escape hatch next to the project: a TOML
//! or JSON document applied as a merge patch over the generated
//! configuration. Keys set to `null` (JSON) are removed, so a user can replace
//! or drop any part of the output.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::merge::apply_merge_patch;

/// Extensions probed, in order, for a given override stem
const EXTENSIONS: &[&str] = &["toml", "json"];

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideFile {
    path: PathBuf,
    patch: Value,
}

impl OverrideFile {
    /// Find and parse the override file for `stem` (`<stem>.toml`, then
    /// `<stem>.json`).
    ///
    /// A missing file is not an error and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OverrideLoad` when a file exists but cannot be
    /// read or parsed.
    pub fn locate(stem: &Path) -> Result<Option<Self>> {
        for extension in EXTENSIONS {
            let path = append_extension(stem, extension);
            if path.is_file() {
                return Self::load(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Parse an override file at an explicit path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::OverrideLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let patch = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                let toml_val: toml::Value =
                    toml::from_str(&content).map_err(|e| ConfigError::OverrideLoad {
                        path: path.to_path_buf(),
                        message: format!("Invalid TOML syntax: {}", e),
                    })?;
                serde_json::to_value(toml_val).map_err(|e| ConfigError::OverrideLoad {
                    path: path.to_path_buf(),
                    message: format!("TOML to JSON conversion failed: {}", e),
                })?
            }
            _ => serde_json::from_str(&content).map_err(|e| ConfigError::OverrideLoad {
                path: path.to_path_buf(),
                message: format!("Invalid JSON: {}", e),
            })?,
        };

        if !patch.is_object() {
            return Err(ConfigError::OverrideLoad {
                path: path.to_path_buf(),
                message: "override must be a table/object at the top level".to_string(),
            });
        }

        debug!(path = %path.display(), "loaded override file");
        Ok(Self {
            path: path.to_path_buf(),
            patch,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn patch(&self) -> &Value {
        &self.patch
    }

    /// Apply the override to a merged configuration document.
    pub fn apply(&self, mut config: Value) -> Value {
        apply_merge_patch(&mut config, &self.patch);
        config
    }
}

/// `web.browser.production` + `toml` -> `web.browser.production.toml`
fn append_extension(stem: &Path, extension: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_os_string();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}
