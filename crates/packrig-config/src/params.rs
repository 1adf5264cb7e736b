//! Per-build parameters handed to the configuration producers.
//!
//! A [`ConfigurationParams`] is built fresh for every build request. Producers
//! only ever borrow it; the one step that needs a modified entry map clones it
//! first, so the caller's object is never touched.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::ProjectSettings;
use crate::target::{Entry, Mode, Target};

/// Output filename templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTemplates {
    pub script: String,

    /// Filename template for split chunks (production)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,

    pub style: String,
    pub font: String,
    pub image: String,
}

impl OutputTemplates {
    pub fn development() -> Self {
        Self {
            script: "[name].js".to_string(),
            chunk: None,
            style: "[name].css".to_string(),
            font: "fonts/[name].[ext]".to_string(),
            image: "images/[name].[ext]".to_string(),
        }
    }

    /// Production templates embedding a caller-supplied content hash.
    ///
    /// # Example
    /// ```
    /// use packrig_config::OutputTemplates;
    ///
    /// let output = OutputTemplates::production("3f9a1c");
    /// assert_eq!(output.script, "[name].3f9a1c.js");
    /// assert_eq!(output.chunk.as_deref(), Some("[name].3f9a1c.chunk.js"));
    /// ```
    pub fn production(hash: &str) -> Self {
        Self {
            script: format!("[name].{hash}.js"),
            chunk: Some(format!("[name].{hash}.chunk.js")),
            style: format!("[name].{hash}.css"),
            font: format!("fonts/[name].{hash}.[ext]"),
            image: format!("images/[name].{hash}.[ext]"),
        }
    }

    pub fn for_mode(mode: Mode, hash: Option<&str>) -> Self {
        match (mode, hash) {
            (Mode::Production, Some(hash)) => Self::production(hash),
            (Mode::Production, None) => Self {
                chunk: Some("[name].chunk.js".to_string()),
                ..Self::development()
            },
            (Mode::Development, _) => Self::development(),
        }
    }
}

impl Default for OutputTemplates {
    fn default() -> Self {
        Self::development()
    }
}

/// One file-copy instruction for production node builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPattern {
    pub from: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
}

/// Dependency names declared by the project's package manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub dev_dependencies: Vec<String>,
}

/// Everything a producer needs to build one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationParams {
    pub target: Target,

    #[serde(default)]
    pub entry: Entry,

    #[serde(default)]
    pub output: OutputTemplates,

    /// Compile-time constant name to replacement value
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,

    #[serde(default)]
    pub copy: Vec<CopyPattern>,

    #[serde(default)]
    pub additional_watch: Vec<PathBuf>,

    #[serde(default)]
    pub package: PackageInfo,

    /// Modules the externals policy keeps bundled by default
    #[serde(default)]
    pub default_externals: Vec<String>,
}

impl ConfigurationParams {
    /// Params for `target` with its own entries and development templates.
    pub fn new(target: Target) -> Self {
        let entry = target.entry.clone();
        Self {
            target,
            entry,
            output: OutputTemplates::development(),
            definitions: IndexMap::new(),
            copy: Vec::new(),
            additional_watch: Vec::new(),
            package: PackageInfo::default(),
            default_externals: Vec::new(),
        }
    }

    /// Gather target and project facts for one build.
    ///
    /// The copy and extra-watch lists only apply to production builds.
    pub fn for_target(
        target: &Target,
        project: &ProjectSettings,
        mode: Mode,
        hash: Option<&str>,
    ) -> Self {
        let production = mode.is_production();
        Self {
            target: target.clone(),
            entry: target.entry.clone(),
            output: OutputTemplates::for_mode(mode, hash),
            definitions: project.definitions.clone(),
            copy: if production {
                project.copy.clone()
            } else {
                Vec::new()
            },
            additional_watch: if production {
                project.additional_watch.clone()
            } else {
                Vec::new()
            },
            package: project.package.clone(),
            default_externals: project.default_externals.clone(),
        }
    }

    pub fn with_entry<I, S>(mut self, name: impl Into<String>, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry
            .insert(name.into(), modules.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_output(mut self, output: OutputTemplates) -> Self {
        self.output = output;
        self
    }

    pub fn with_definition(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.definitions.insert(name.into(), value.into());
        self
    }

    /// The first entry in insertion order.
    pub fn primary_entry(&self) -> Option<(&String, &Vec<String>)> {
        self.entry.first()
    }
}
