//! Project settings and the settings store used by the orchestrator.
//!
//! Settings are layered with figment: built-in defaults, then `packrig.toml`
//! in the project root, then `PACKRIG_`-prefixed environment variables.
//! Dependency names come from `package.json` unless the settings file lists
//! them explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::helpers::default_override_dir;
use crate::params::{CopyPattern, PackageInfo};
use crate::target::Target;

/// Name of the settings file looked up in the project root
pub const SETTINGS_FILE: &str = "packrig.toml";

/// Supplies project- and target-level configuration values.
pub trait SettingsStore: Send + Sync {
    fn project(&self) -> &ProjectSettings;

    fn target(&self, name: &str) -> Option<&Target> {
        self.project().targets.get(name)
    }

    /// Like [`SettingsStore::target`] but fails with
    /// [`ConfigError::TargetNotFound`].
    fn require_target(&self, name: &str) -> Result<&Target> {
        self.target(name)
            .ok_or_else(|| ConfigError::TargetNotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Project root; set by [`ProjectSettings::load`]
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub targets: IndexMap<String, Target>,

    /// Compile-time constants injected into every build
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,

    /// Modules the externals policy keeps bundled by default
    #[serde(default)]
    pub default_externals: Vec<String>,

    /// Files copied next to production node builds
    #[serde(default)]
    pub copy: Vec<CopyPattern>,

    /// Extra files watched by production node builds
    #[serde(default)]
    pub additional_watch: Vec<PathBuf>,

    /// Directory holding per-target override files, relative to `root`
    #[serde(default = "default_override_dir")]
    pub override_dir: PathBuf,

    #[serde(default)]
    pub package: PackageInfo,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            targets: IndexMap::new(),
            definitions: IndexMap::new(),
            default_externals: Vec::new(),
            copy: Vec::new(),
            additional_watch: Vec::new(),
            override_dir: default_override_dir(),
            package: PackageInfo::default(),
        }
    }
}

impl ProjectSettings {
    /// Load settings from `root`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `root` has no `packrig.toml`, and
    /// `ConfigError::InvalidValue` if it cannot be parsed.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            return Err(ConfigError::NotFound(root.to_path_buf()));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(ProjectSettings::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PACKRIG_").split("__"));

        let mut settings: ProjectSettings =
            figment.extract().map_err(|e| ConfigError::InvalidValue {
                field: SETTINGS_FILE.to_string(),
                hint: Some(e.to_string()),
            })?;

        settings.restore_declared_order(&path)?;
        settings.root = root.to_path_buf();
        if settings.package == PackageInfo::default() {
            if let Some(package) = read_package_json(root)? {
                settings.package = package;
            }
        }
        settings.normalize();

        debug!(
            root = %root.display(),
            targets = settings.targets.len(),
            "loaded project settings"
        );
        Ok(settings)
    }

    /// Create from serde_json::Value (for programmatic settings)
    ///
    /// # Example
    ///
    /// ```
    /// use packrig_config::ProjectSettings;
    /// use serde_json::json;
    ///
    /// let settings = ProjectSettings::from_value(json!({
    ///     "targets": { "web": { "environment": "browser" } }
    /// }))
    /// .unwrap();
    /// assert_eq!(settings.targets["web"].name, "web");
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let mut settings: ProjectSettings =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "settings".to_string(),
                hint: Some(e.to_string()),
            })?;
        settings.normalize();
        Ok(settings)
    }

    /// Register a target under its own name.
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.insert(target.name.clone(), target);
        self
    }

    /// Absolute location of the override directory.
    pub fn override_dir(&self) -> PathBuf {
        self.root.join(&self.override_dir)
    }

    /// figment hands tables back sorted by key. Targets and entries keep the
    /// order `packrig.toml` declares them in; the first entry is the primary
    /// one.
    fn restore_declared_order(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let document: toml::Table =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: SETTINGS_FILE.to_string(),
                hint: Some(e.to_string()),
            })?;
        let Some(declared) = document.get("targets").and_then(toml::Value::as_table) else {
            return Ok(());
        };

        reorder(&mut self.targets, declared.keys());
        for (name, target) in self.targets.iter_mut() {
            let entry = declared
                .get(name)
                .and_then(|table| table.get("entry"))
                .and_then(toml::Value::as_table);
            if let Some(entry) = entry {
                reorder(&mut target.entry, entry.keys());
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        for (key, target) in self.targets.iter_mut() {
            if target.name.is_empty() {
                target.name = key.clone();
            }
        }
    }
}

impl SettingsStore for ProjectSettings {
    fn project(&self) -> &ProjectSettings {
        self
    }
}

/// Sort `map` by the position of each key in `declared`. Keys that were not
/// declared (e.g. added through the environment) keep their relative order at
/// the end.
fn reorder<'a, V>(map: &mut IndexMap<String, V>, declared: impl Iterator<Item = &'a String>) {
    let declared: Vec<&String> = declared.collect();
    let rank = |key: &String| {
        declared
            .iter()
            .position(|name| *name == key)
            .unwrap_or(declared.len())
    };
    map.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));
}

/// Read dependency names from `<root>/package.json`, if present.
fn read_package_json(root: &Path) -> Result<Option<PackageInfo>> {
    let path = root.join("package.json");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {}", e)),
    })?;

    let names = |field: &str| -> Vec<String> {
        parsed
            .get(field)
            .and_then(Value::as_object)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    };

    Ok(Some(PackageInfo {
        dependencies: names("dependencies"),
        dev_dependencies: names("devDependencies"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Environment;
    use tempfile::TempDir;

    #[test]
    fn load_returns_not_found_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let result = ProjectSettings::load(dir.path());
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn package_json_supplies_dependencies_in_manifest_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "[targets.web]\n").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "demo",
                "dependencies": { "react": "^18", "express": "^4" },
                "devDependencies": { "jest": "^29" }
            }"#,
        )
        .unwrap();

        let settings = ProjectSettings::load(dir.path()).unwrap();
        assert_eq!(settings.package.dependencies, vec!["react", "express"]);
        assert_eq!(settings.package.dev_dependencies, vec!["jest"]);
        assert_eq!(settings.targets["web"].environment, Environment::Browser);
    }

    #[test]
    fn malformed_package_json_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "").unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();

        let err = ProjectSettings::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn targets_and_entries_keep_declared_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"
[targets.web]
environment = "browser"

[targets.web.entry]
main = ["./src/index.js"]
admin = ["./src/admin.js"]
zebra = ["./src/zebra.js"]

[targets.api]
environment = "node"

[targets.api.entry]
server = ["./src/server.js"]
"#,
        )
        .unwrap();

        let settings = ProjectSettings::load(dir.path()).unwrap();
        let targets: Vec<&str> = settings.targets.keys().map(String::as_str).collect();
        assert_eq!(targets, vec!["web", "api"]);

        let entries: Vec<&str> = settings.targets["web"].entry.keys().map(String::as_str).collect();
        assert_eq!(entries, vec!["main", "admin", "zebra"]);
    }

    #[test]
    fn reorder_keeps_undeclared_keys_last() {
        let mut map: IndexMap<String, u8> = IndexMap::new();
        for key in ["b", "extra", "a"] {
            map.insert(key.to_string(), 0);
        }
        let declared = vec!["a".to_string(), "b".to_string()];
        reorder(&mut map, declared.iter());

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "extra"]);
    }

    #[test]
    fn require_target_reports_unknown_names() {
        let settings =
            ProjectSettings::default().with_target(Target::new("web", Environment::Browser));
        assert!(settings.require_target("web").is_ok());
        assert!(matches!(
            settings.require_target("api"),
            Err(ConfigError::TargetNotFound(name)) if name == "api"
        ));
    }
}
