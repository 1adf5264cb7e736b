//! Extension point names.
//!
//! Each producer reduces its value through a specific point first and a
//! general one second, so a handler can target one environment or both.
//!
//! Value types: category points reduce `Vec<Rule>`, the `rules` points reduce
//! [`RuleSet`](crate::RuleSet), and every config point reduces
//! [`BundlerConfig`](crate::BundlerConfig). The context is always
//! `ConfigurationParams`.

use packrig_config::{Environment, Mode};

pub const RULES: &str = "rules";
pub const RULES_FOR_NODE: &str = "rules-for-node";
pub const RULES_FOR_BROWSER: &str = "rules-for-browser";

pub const BASE_CONFIG_FOR_NODE: &str = "base-config-for-node";
pub const BASE_CONFIG_FOR_BROWSER: &str = "base-config-for-browser";

pub const NODE_CONFIG: &str = "node-config";
pub const BROWSER_CONFIG: &str = "browser-config";
pub const NODE_DEVELOPMENT_CONFIG: &str = "node-development-config";
pub const NODE_PRODUCTION_CONFIG: &str = "node-production-config";
pub const BROWSER_DEVELOPMENT_CONFIG: &str = "browser-development-config";
pub const BROWSER_PRODUCTION_CONFIG: &str = "browser-production-config";

/// Rule groups, in the order they appear in the rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Script,
    Scss,
    Css,
    Html,
    Font,
    Image,
    Icon,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 7] = [
        RuleCategory::Script,
        RuleCategory::Scss,
        RuleCategory::Css,
        RuleCategory::Html,
        RuleCategory::Font,
        RuleCategory::Image,
        RuleCategory::Icon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleCategory::Script => "script",
            RuleCategory::Scss => "scss",
            RuleCategory::Css => "css",
            RuleCategory::Html => "html",
            RuleCategory::Font => "font",
            RuleCategory::Image => "image",
            RuleCategory::Icon => "icon",
        }
    }

    /// General point for the category, e.g. `script-rules`
    pub fn point(self) -> &'static str {
        match self {
            RuleCategory::Script => "script-rules",
            RuleCategory::Scss => "scss-rules",
            RuleCategory::Css => "css-rules",
            RuleCategory::Html => "html-rules",
            RuleCategory::Font => "font-rules",
            RuleCategory::Image => "image-rules",
            RuleCategory::Icon => "icon-rules",
        }
    }

    /// Environment-specific point, e.g. `script-rules-for-node`
    pub fn point_for(self, environment: Environment) -> &'static str {
        match (self, environment) {
            (RuleCategory::Script, Environment::Node) => "script-rules-for-node",
            (RuleCategory::Script, Environment::Browser) => "script-rules-for-browser",
            (RuleCategory::Scss, Environment::Node) => "scss-rules-for-node",
            (RuleCategory::Scss, Environment::Browser) => "scss-rules-for-browser",
            (RuleCategory::Css, Environment::Node) => "css-rules-for-node",
            (RuleCategory::Css, Environment::Browser) => "css-rules-for-browser",
            (RuleCategory::Html, Environment::Node) => "html-rules-for-node",
            (RuleCategory::Html, Environment::Browser) => "html-rules-for-browser",
            (RuleCategory::Font, Environment::Node) => "font-rules-for-node",
            (RuleCategory::Font, Environment::Browser) => "font-rules-for-browser",
            (RuleCategory::Image, Environment::Node) => "image-rules-for-node",
            (RuleCategory::Image, Environment::Browser) => "image-rules-for-browser",
            (RuleCategory::Icon, Environment::Node) => "icon-rules-for-node",
            (RuleCategory::Icon, Environment::Browser) => "icon-rules-for-browser",
        }
    }
}

pub fn rules_for(environment: Environment) -> &'static str {
    match environment {
        Environment::Node => RULES_FOR_NODE,
        Environment::Browser => RULES_FOR_BROWSER,
    }
}

pub fn base_config_for(environment: Environment) -> &'static str {
    match environment {
        Environment::Node => BASE_CONFIG_FOR_NODE,
        Environment::Browser => BASE_CONFIG_FOR_BROWSER,
    }
}

pub fn environment_config(environment: Environment) -> &'static str {
    match environment {
        Environment::Node => NODE_CONFIG,
        Environment::Browser => BROWSER_CONFIG,
    }
}

pub fn variant_config(environment: Environment, mode: Mode) -> &'static str {
    match (environment, mode) {
        (Environment::Node, Mode::Development) => NODE_DEVELOPMENT_CONFIG,
        (Environment::Node, Mode::Production) => NODE_PRODUCTION_CONFIG,
        (Environment::Browser, Mode::Development) => BROWSER_DEVELOPMENT_CONFIG,
        (Environment::Browser, Mode::Production) => BROWSER_PRODUCTION_CONFIG,
    }
}

/// Every point a producer reduces through, for listing.
pub fn all() -> Vec<&'static str> {
    let mut points = Vec::new();
    for category in RuleCategory::ALL {
        points.push(category.point_for(Environment::Node));
        points.push(category.point_for(Environment::Browser));
        points.push(category.point());
    }
    points.extend([
        RULES_FOR_NODE,
        RULES_FOR_BROWSER,
        RULES,
        BASE_CONFIG_FOR_NODE,
        BASE_CONFIG_FOR_BROWSER,
        NODE_DEVELOPMENT_CONFIG,
        NODE_PRODUCTION_CONFIG,
        BROWSER_DEVELOPMENT_CONFIG,
        BROWSER_PRODUCTION_CONFIG,
        NODE_CONFIG,
        BROWSER_CONFIG,
    ]);
    points
}
