//! The bundler configuration record.
//!
//! Field names and nesting are the wire contract with the bundler, so the
//! serde attributes here matter more than the Rust names. Everything is plain
//! data: a configuration is built fresh on every call and never cached.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use packrig_config::{CopyPattern, Entry, Mode, PackageInfo, ScriptAttribute};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Execution context the bundle is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionTarget {
    Web,
    Node,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ExecutionTarget>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub entry: Entry,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve: Option<Resolve>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<Plugin>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<ExternalsPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServerConfig>,

    /// Fields added by extension code that packrig does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundlerConfig {
    pub fn rules(&self) -> &[Rule] {
        self.module.as_ref().map_or(&[], |module| module.rules.as_slice())
    }

    /// Plugin names in order, as they appear on the wire.
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(Plugin::name).collect()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub path: PathBuf,
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolve {
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub modules: Vec<String>,
}

/// `include`/`exclude` condition of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Matches files under a directory
    Path(PathBuf),
    /// Matches files whose path matches a regex
    Pattern(String),
}

impl Condition {
    fn matches(&self, path: &Path, normalized: &str) -> Result<bool, regex::Error> {
        match self {
            Condition::Path(dir) => Ok(path.starts_with(dir)),
            Condition::Pattern(pattern) => Ok(Regex::new(pattern)?.is_match(normalized)),
        }
    }
}

/// A loader in a rule's `use` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderUse {
    pub loader: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl LoaderUse {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// A module transform rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Regex source matched against the file path
    pub test: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Condition>,

    #[serde(rename = "use")]
    pub loaders: Vec<LoaderUse>,
}

impl Rule {
    pub fn new(test: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            loaders: Vec::new(),
        }
    }

    pub fn include(mut self, condition: Condition) -> Self {
        self.include.push(condition);
        self
    }

    pub fn exclude(mut self, condition: Condition) -> Self {
        self.exclude.push(condition);
        self
    }

    pub fn loader(mut self, loader: LoaderUse) -> Self {
        self.loaders.push(loader);
        self
    }

    pub fn loader_names(&self) -> Vec<&str> {
        self.loaders.iter().map(|l| l.loader.as_str()).collect()
    }

    /// Whether the bundler would apply this rule to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when `test` or a pattern condition is not a valid regex.
    pub fn matches(&self, path: impl AsRef<Path>) -> Result<bool, regex::Error> {
        let path = path.as_ref();
        let normalized = path.to_string_lossy().replace('\\', "/");

        if !Regex::new(&self.test)?.is_match(&normalized) {
            return Ok(false);
        }

        if !self.include.is_empty() {
            let mut included = false;
            for condition in &self.include {
                if condition.matches(path, &normalized)? {
                    included = true;
                    break;
                }
            }
            if !included {
                return Ok(false);
            }
        }

        for condition in &self.exclude {
            if condition.matches(path, &normalized)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Bundler plugins, serialized as `{ "name": ..., "options": { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "options", rename_all = "kebab-case")]
pub enum Plugin {
    /// Skip emitting assets when compilation fails
    NoEmitOnErrors,
    /// Deduplicate and optimize emitted stylesheets
    OptimizeCss,
    /// Extract stylesheets into their own file
    ExtractCss { filename: String },
    /// Inject bundles into an HTML template
    #[serde(rename_all = "camelCase")]
    Html {
        template: PathBuf,
        filename: String,
        inject: bool,
    },
    /// Add an attribute to generated script tags
    #[serde(rename_all = "camelCase")]
    ScriptAttributes { default_attribute: ScriptAttribute },
    /// Compile-time constant replacement
    Define { definitions: IndexMap<String, Value> },
    #[serde(rename_all = "camelCase")]
    Minify { source_map: bool },
    Compression {
        algorithm: String,
        test: String,
        threshold: u64,
    },
    HotModuleReplacement,
    NamedModules,
    Copy { patterns: Vec<CopyPattern> },
    ExtraWatch { files: Vec<PathBuf> },
    /// Execute the compiled output after every compile
    RunOnCompile { name: String, script: PathBuf },
    /// Anything contributed by extension code
    Custom { id: String, options: Value },
}

impl Plugin {
    pub fn name(&self) -> &'static str {
        match self {
            Plugin::NoEmitOnErrors => "no-emit-on-errors",
            Plugin::OptimizeCss => "optimize-css",
            Plugin::ExtractCss { .. } => "extract-css",
            Plugin::Html { .. } => "html",
            Plugin::ScriptAttributes { .. } => "script-attributes",
            Plugin::Define { .. } => "define",
            Plugin::Minify { .. } => "minify",
            Plugin::Compression { .. } => "compression",
            Plugin::HotModuleReplacement => "hot-module-replacement",
            Plugin::NamedModules => "named-modules",
            Plugin::Copy { .. } => "copy",
            Plugin::ExtraWatch { .. } => "extra-watch",
            Plugin::RunOnCompile { .. } => "run-on-compile",
            Plugin::Custom { .. } => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOptions {
    #[serde(rename = "__dirname")]
    pub dirname: bool,
}

/// Which packages stay out of a node bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalsPolicy {
    /// Declared dependencies left to `require` at runtime
    pub modules: Vec<String>,
    /// Packages bundled even though they are declared dependencies
    pub allowlist: Vec<String>,
    /// Dev-only dependencies are treated as externals too
    pub dev_dependencies: bool,
}

impl ExternalsPolicy {
    pub fn new(package: &PackageInfo, allowlist: Vec<String>, dev_dependencies: bool) -> Self {
        let declared = package.dependencies.iter().chain(
            package
                .dev_dependencies
                .iter()
                .filter(|_| dev_dependencies),
        );

        let mut modules: Vec<String> = Vec::new();
        for name in declared {
            if !allowlist.contains(name) && !modules.contains(name) {
                modules.push(name.clone());
            }
        }

        Self {
            modules,
            allowlist,
            dev_dependencies,
        }
    }

    /// Whether `request` resolves to a package left external.
    ///
    /// # Example
    /// ```
    /// use packrig_config::PackageInfo;
    /// use packrig_producers::ExternalsPolicy;
    ///
    /// let package = PackageInfo {
    ///     dependencies: vec!["express".into(), "@scope/util".into()],
    ///     dev_dependencies: vec![],
    /// };
    /// let policy = ExternalsPolicy::new(&package, vec![], false);
    /// assert!(policy.is_external("express/lib/router"));
    /// assert!(policy.is_external("@scope/util"));
    /// assert!(!policy.is_external("./express"));
    /// ```
    pub fn is_external(&self, request: &str) -> bool {
        let Some(package) = package_name(request) else {
            return false;
        };
        self.modules.iter().any(|module| module == package)
    }
}

/// `@scope/name/sub` -> `@scope/name`, `name/sub` -> `name`, relative -> None
fn package_name(request: &str) -> Option<&str> {
    if request.starts_with('.') || request.starts_with('/') {
        return None;
    }

    let mut separators = request.match_indices('/').map(|(index, _)| index);
    let end = if request.starts_with('@') {
        separators.nth(1)
    } else {
        separators.next()
    };
    Some(end.map_or(request, |end| &request[..end]))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerConfig {
    pub host: String,
    pub port: u16,
    pub inline: bool,

    #[serde(default)]
    pub hot: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}
