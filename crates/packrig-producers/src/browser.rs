//! Browser configurations.

use std::path::PathBuf;
use std::sync::Arc;

use packrig_config::{ConfigurationParams, Entry, Mode, Target, Validate};
use packrig_reducer::ReducerPipeline;
use tracing::debug;

use crate::base::BaseConfig;
use crate::config_file::{ConfigFile, OverrideLocator};
use crate::error::Result;
use crate::points;
use crate::schema::{BundlerConfig, DevServerConfig, ExecutionTarget, Output, Plugin};

/// Entries after which hot clients are inserted, so the polyfill still runs first
pub const POLYFILL_ENTRIES: &[&str] = &["babel-polyfill", "@babel/polyfill"];

pub const HOT_MIDDLEWARE_CLIENT: &str = "webpack-hot-middleware/client";
pub const HOT_ONLY_DEV_SERVER: &str = "webpack/hot/only-dev-server";

const COMPRESSION_TEST: &str = r"\.(js|css|html|svg)$";
const COMPRESSION_THRESHOLD: u64 = 10_240;

pub struct BrowserDevelopmentConfig {
    pipeline: Arc<ReducerPipeline>,
    base: Arc<BaseConfig>,
    overrides: OverrideLocator,
}

impl BrowserDevelopmentConfig {
    pub const KEY: &'static str = "config.browser.development";

    pub fn new(pipeline: Arc<ReducerPipeline>, base: Arc<BaseConfig>, overrides: OverrideLocator) -> Self {
        Self {
            pipeline,
            base,
            overrides,
        }
    }
}

impl ConfigFile for BrowserDevelopmentConfig {
    type Output = BundlerConfig;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn create_config(&self, params: &ConfigurationParams) -> Result<BundlerConfig> {
        params.validate()?;
        let target = &params.target;

        let mut entry = params.entry.clone();
        let mut dev_server = None;
        let hot_entries = match target.integrated_dev_server() {
            Some(server) => {
                let mut config = DevServerConfig {
                    host: server.host.clone(),
                    port: server.port,
                    inline: server.inline,
                    hot: false,
                    public_path: None,
                };
                let entries = if target.hot {
                    config.inline = false;
                    config.hot = true;
                    config.public_path = Some("/".to_string());
                    vec![
                        format!("webpack-dev-server/client?{}", server.url()),
                        HOT_ONLY_DEV_SERVER.to_string(),
                    ]
                } else {
                    Vec::new()
                };
                dev_server = Some(config);
                entries
            }
            None if target.hot => vec![HOT_MIDDLEWARE_CLIENT.to_string()],
            None => Vec::new(),
        };
        insert_hot_entries(&mut entry, &hot_entries);

        let mut plugins = vec![
            Plugin::ExtractCss {
                filename: params.output.style.clone(),
            },
            Plugin::OptimizeCss,
        ];
        plugins.extend(page_plugins(target));
        if target.hot {
            plugins.push(Plugin::HotModuleReplacement);
            plugins.push(Plugin::NamedModules);
        }
        plugins.push(Plugin::NoEmitOnErrors);
        plugins.push(Plugin::Define {
            definitions: params.definitions.clone(),
        });

        let config = BundlerConfig {
            mode: Some(Mode::Development),
            target: Some(ExecutionTarget::Web),
            entry,
            output: Some(browser_output(params)),
            plugins,
            devtool: target.source_map.development.clone(),
            dev_server,
            ..BundlerConfig::default()
        };

        debug!(target_name = %target.name, hot = target.hot, "created browser development config");
        let config = self.pipeline.reduce(
            &[points::BROWSER_DEVELOPMENT_CONFIG, points::BROWSER_CONFIG],
            config,
            params,
        )?;
        Ok(config)
    }

    fn extends(&self) -> Option<&dyn ConfigFile<Output = BundlerConfig>> {
        Some(self.base.as_ref())
    }

    fn override_path(&self, params: &ConfigurationParams) -> Option<PathBuf> {
        self.overrides.stem(params, Mode::Development)
    }
}

pub struct BrowserProductionConfig {
    pipeline: Arc<ReducerPipeline>,
    base: Arc<BaseConfig>,
    overrides: OverrideLocator,
}

impl BrowserProductionConfig {
    pub const KEY: &'static str = "config.browser.production";

    pub fn new(pipeline: Arc<ReducerPipeline>, base: Arc<BaseConfig>, overrides: OverrideLocator) -> Self {
        Self {
            pipeline,
            base,
            overrides,
        }
    }
}

impl ConfigFile for BrowserProductionConfig {
    type Output = BundlerConfig;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn create_config(&self, params: &ConfigurationParams) -> Result<BundlerConfig> {
        params.validate()?;
        let target = &params.target;

        let mut plugins = vec![
            Plugin::ExtractCss {
                filename: params.output.style.clone(),
            },
            Plugin::OptimizeCss,
        ];
        plugins.extend(page_plugins(target));
        plugins.push(Plugin::Define {
            definitions: params.definitions.clone(),
        });
        plugins.push(Plugin::Minify {
            source_map: target.source_map.production,
        });
        if !target.library || target.compress {
            plugins.push(Plugin::Compression {
                algorithm: "gzip".to_string(),
                test: COMPRESSION_TEST.to_string(),
                threshold: COMPRESSION_THRESHOLD,
            });
        }

        let mut output = browser_output(params);
        output.chunk_filename = params.output.chunk.clone();
        if target.library {
            output.library = Some(target.name.clone());
            output.library_target = Some("umd".to_string());
        }

        let config = BundlerConfig {
            mode: Some(Mode::Production),
            target: Some(ExecutionTarget::Web),
            entry: params.entry.clone(),
            output: Some(output),
            plugins,
            devtool: target
                .source_map
                .production
                .then(|| "source-map".to_string()),
            ..BundlerConfig::default()
        };

        debug!(target_name = %target.name, library = target.library, "created browser production config");
        let config = self.pipeline.reduce(
            &[points::BROWSER_PRODUCTION_CONFIG, points::BROWSER_CONFIG],
            config,
            params,
        )?;
        Ok(config)
    }

    fn extends(&self) -> Option<&dyn ConfigFile<Output = BundlerConfig>> {
        Some(self.base.as_ref())
    }

    fn override_path(&self, params: &ConfigurationParams) -> Option<PathBuf> {
        self.overrides.stem(params, Mode::Production)
    }
}

fn browser_output(params: &ConfigurationParams) -> Output {
    Output {
        path: params.target.build_folder.clone(),
        filename: params.output.script.clone(),
        chunk_filename: None,
        public_path: Some(params.target.public_path.clone()),
        library: None,
        library_target: None,
    }
}

/// HTML generation and script attributes, both skipped for library targets.
fn page_plugins(target: &Target) -> Vec<Plugin> {
    if target.library {
        return Vec::new();
    }

    let html = target.html.clone().unwrap_or_default();
    let template = html
        .template
        .unwrap_or_else(|| target.src_folder.join("index.html"));

    vec![
        Plugin::Html {
            template,
            filename: html.filename,
            inject: true,
        },
        Plugin::ScriptAttributes {
            default_attribute: html.script_attribute,
        },
    ]
}

/// Insert hot clients into the primary (first) entry, right after a polyfill
/// when one is present and at the front otherwise.
///
/// # Example
/// ```
/// use packrig_config::Entry;
/// use packrig_producers::browser::insert_hot_entries;
///
/// let mut entry = Entry::new();
/// entry.insert("main".into(), vec!["babel-polyfill".into(), "./index.js".into()]);
/// insert_hot_entries(&mut entry, &["hot-client".to_string()]);
/// assert_eq!(entry["main"], vec!["babel-polyfill", "hot-client", "./index.js"]);
/// ```
pub fn insert_hot_entries(entry: &mut Entry, hot_entries: &[String]) {
    if hot_entries.is_empty() {
        return;
    }
    let Some((_, modules)) = entry.first_mut() else {
        return;
    };

    let at = modules
        .iter()
        .position(|module| POLYFILL_ENTRIES.contains(&module.as_str()))
        .map_or(0, |index| index + 1);
    modules.splice(at..at, hot_entries.iter().cloned());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_entries_go_to_the_front_without_polyfill() {
        let mut entry = Entry::new();
        entry.insert("main".into(), vec!["./index.js".into()]);
        entry.insert("admin".into(), vec!["./admin.js".into()]);

        insert_hot_entries(&mut entry, &[HOT_MIDDLEWARE_CLIENT.to_string()]);

        assert_eq!(entry["main"], vec![HOT_MIDDLEWARE_CLIENT, "./index.js"]);
        assert_eq!(entry["admin"], vec!["./admin.js"]);
    }

    #[test]
    fn hot_entries_follow_scoped_polyfill() {
        let mut entry = Entry::new();
        entry.insert(
            "main".into(),
            vec!["./env.js".into(), "@babel/polyfill".into(), "./index.js".into()],
        );

        insert_hot_entries(&mut entry, &["a".to_string(), "b".to_string()]);

        assert_eq!(entry["main"], vec!["./env.js", "@babel/polyfill", "a", "b", "./index.js"]);
    }

    #[test]
    fn library_targets_have_no_page_plugins() {
        let mut target = Target::new("widget", packrig_config::Environment::Browser);
        assert_eq!(page_plugins(&target).len(), 2);
        target.library = true;
        assert!(page_plugins(&target).is_empty());
    }

    #[test]
    fn default_template_lives_in_sources() {
        let target = Target::new("web", packrig_config::Environment::Browser);
        match &page_plugins(&target)[0] {
            Plugin::Html { template, filename, .. } => {
                assert_eq!(template, &PathBuf::from("src/index.html"));
                assert_eq!(filename, "index.html");
            }
            other => panic!("unexpected plugin {other:?}"),
        }
    }
}
