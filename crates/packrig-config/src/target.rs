//! Build target description.
//!
//! A [`Target`] is a named build output (an app, a server, a library) with its
//! own source and build folders and the per-mode flags the producers branch on.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::helpers::{
    default_build_folder, default_devtool, default_host, default_html_filename, default_port,
    default_public_path, default_src_folder, default_true,
};

/// Entry-point name to ordered module specifiers. The first entry is the
/// primary one.
pub type Entry = IndexMap<String, Vec<String>>;

/// Execution environment of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Browser environment (default)
    #[default]
    Browser,
    /// Node.js
    Node,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Browser => "browser",
            Environment::Node => "node",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" | "web" => Ok(Environment::Browser),
            "node" => Ok(Environment::Node),
            other => Err(format!("Invalid environment: {}", other)),
        }
    }
}

/// Build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(format!("Invalid mode: {}", other)),
        }
    }
}

/// Stylesheet handling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssOptions {
    /// Enable CSS modules (scoped class names)
    #[serde(default)]
    pub modules: bool,

    /// Inject styles into the document instead of extracting them to a file
    #[serde(default)]
    pub inject: bool,
}

/// Attribute added to generated script tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptAttribute {
    #[default]
    Defer,
    Async,
}

/// HTML template injection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlOptions {
    /// Template path, relative to the project root. Defaults to
    /// `<src_folder>/index.html`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Output filename for the generated HTML (default: "index.html")
    #[serde(default = "default_html_filename")]
    pub filename: String,

    #[serde(default)]
    pub script_attribute: ScriptAttribute,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            template: None,
            filename: default_html_filename(),
            script_attribute: ScriptAttribute::default(),
        }
    }
}

/// Source map flags per mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapOptions {
    /// Devtool used in development; `None` disables source maps
    #[serde(default = "default_devtool")]
    pub development: Option<String>,

    /// Emit source maps for production builds
    #[serde(default)]
    pub production: bool,
}

impl Default for SourceMapOptions {
    fn default() -> Self {
        Self {
            development: default_devtool(),
            production: false,
        }
    }
}

/// Dev-server settings for browser targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevServerOptions {
    /// Run through the integrated dev server. When false an external HTTP
    /// server mounts the dev middleware instead.
    #[serde(default = "default_true")]
    pub integrated: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Inline live-reload client
    #[serde(default = "default_true")]
    pub inline: bool,
}

impl Default for DevServerOptions {
    fn default() -> Self {
        Self {
            integrated: true,
            host: default_host(),
            port: default_port(),
            inline: true,
        }
    }
}

impl DevServerOptions {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// A named build target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Filled from the settings table key when loaded from a file
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_src_folder")]
    pub src_folder: PathBuf,

    #[serde(default = "default_build_folder")]
    pub build_folder: PathBuf,

    /// Packages under node_modules transpiled like project sources
    #[serde(default)]
    pub include_modules: Vec<String>,

    /// Packages explicitly excluded from the externals policy
    #[serde(default)]
    pub exclude_modules: Vec<String>,

    #[serde(default)]
    pub css: CssOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<HtmlOptions>,

    #[serde(default)]
    pub source_map: SourceMapOptions,

    /// Hot module replacement in development
    #[serde(default)]
    pub hot: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServerOptions>,

    /// Library targets skip HTML generation
    #[serde(default)]
    pub library: bool,

    /// Gzip production output. Only library targets may opt out.
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Execute the compiled output after each development compile (node)
    #[serde(default)]
    pub run_on_build: bool,

    #[serde(default = "default_public_path")]
    pub public_path: String,

    #[serde(default)]
    pub entry: Entry,
}

impl Target {
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            environment,
            src_folder: default_src_folder(),
            build_folder: default_build_folder(),
            include_modules: Vec::new(),
            exclude_modules: Vec::new(),
            css: CssOptions::default(),
            html: None,
            source_map: SourceMapOptions::default(),
            hot: false,
            dev_server: None,
            library: false,
            compress: true,
            run_on_build: false,
            public_path: default_public_path(),
            entry: Entry::new(),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self.environment, Environment::Node)
    }

    pub fn is_browser(&self) -> bool {
        matches!(self.environment, Environment::Browser)
    }

    /// Dev server settings, only when the integrated server is in use.
    pub fn integrated_dev_server(&self) -> Option<&DevServerOptions> {
        self.dev_server.as_ref().filter(|server| server.integrated)
    }

    /// Add an entry point
    ///
    /// # Example
    /// ```
    /// use packrig_config::{Environment, Target};
    ///
    /// let target = Target::new("web", Environment::Browser)
    ///     .with_entry("main", ["babel-polyfill", "./index.js"]);
    /// assert_eq!(target.entry["main"].len(), 2);
    /// ```
    pub fn with_entry<I, S>(mut self, name: impl Into<String>, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry
            .insert(name.into(), modules.into_iter().map(Into::into).collect());
        self
    }
}
