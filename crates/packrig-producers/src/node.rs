//! Node configurations.

use std::path::PathBuf;
use std::sync::Arc;

use packrig_config::{ConfigurationParams, Mode, Validate};
use packrig_reducer::ReducerPipeline;
use tracing::debug;

use crate::base::BaseConfig;
use crate::config_file::{ConfigFile, OverrideLocator};
use crate::error::Result;
use crate::points;
use crate::schema::{BundlerConfig, ExecutionTarget, ExternalsPolicy, NodeOptions, Output, Plugin};

pub struct NodeDevelopmentConfig {
    pipeline: Arc<ReducerPipeline>,
    base: Arc<BaseConfig>,
    overrides: OverrideLocator,
}

impl NodeDevelopmentConfig {
    pub const KEY: &'static str = "config.node.development";

    pub fn new(pipeline: Arc<ReducerPipeline>, base: Arc<BaseConfig>, overrides: OverrideLocator) -> Self {
        Self {
            pipeline,
            base,
            overrides,
        }
    }
}

impl ConfigFile for NodeDevelopmentConfig {
    type Output = BundlerConfig;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn create_config(&self, params: &ConfigurationParams) -> Result<BundlerConfig> {
        params.validate()?;
        let target = &params.target;

        let mut plugins = vec![Plugin::NoEmitOnErrors, Plugin::OptimizeCss];
        if target.run_on_build {
            plugins.push(Plugin::RunOnCompile {
                name: target.name.clone(),
                script: compiled_entry(params),
            });
        }

        let config = BundlerConfig {
            mode: Some(Mode::Development),
            plugins,
            devtool: target.source_map.development.clone(),
            watch: Some(target.run_on_build),
            externals: Some(externals(params, Mode::Development)),
            ..node_config(params)
        };

        debug!(target_name = %target.name, run_on_build = target.run_on_build, "created node development config");
        let config = self.pipeline.reduce(
            &[points::NODE_DEVELOPMENT_CONFIG, points::NODE_CONFIG],
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

pub struct NodeProductionConfig {
    pipeline: Arc<ReducerPipeline>,
    base: Arc<BaseConfig>,
    overrides: OverrideLocator,
}

impl NodeProductionConfig {
    pub const KEY: &'static str = "config.node.production";

    pub fn new(pipeline: Arc<ReducerPipeline>, base: Arc<BaseConfig>, overrides: OverrideLocator) -> Self {
        Self {
            pipeline,
            base,
            overrides,
        }
    }
}

impl ConfigFile for NodeProductionConfig {
    type Output = BundlerConfig;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn create_config(&self, params: &ConfigurationParams) -> Result<BundlerConfig> {
        params.validate()?;
        let target = &params.target;

        let mut plugins = vec![
            Plugin::NoEmitOnErrors,
            Plugin::OptimizeCss,
            Plugin::Copy {
                patterns: params.copy.clone(),
            },
        ];
        if !params.additional_watch.is_empty() {
            plugins.push(Plugin::ExtraWatch {
                files: params.additional_watch.clone(),
            });
        }

        let config = BundlerConfig {
            mode: Some(Mode::Production),
            plugins,
            devtool: target
                .source_map
                .production
                .then(|| "source-map".to_string()),
            externals: Some(externals(params, Mode::Production)),
            ..node_config(params)
        };

        debug!(target_name = %target.name, "created node production config");
        let config = self.pipeline.reduce(
            &[points::NODE_PRODUCTION_CONFIG, points::NODE_CONFIG],
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

/// Fields shared by both node modes
fn node_config(params: &ConfigurationParams) -> BundlerConfig {
    BundlerConfig {
        target: Some(ExecutionTarget::Node),
        entry: params.entry.clone(),
        output: Some(Output {
            path: params.target.build_folder.clone(),
            filename: params.output.script.clone(),
            chunk_filename: None,
            public_path: None,
            library: None,
            library_target: Some("commonjs2".to_string()),
        }),
        node: Some(NodeOptions { dirname: false }),
        ..BundlerConfig::default()
    }
}

/// Declared dependencies stay external unless allow-listed. Dev dependencies
/// are only external in development.
fn externals(params: &ConfigurationParams, mode: Mode) -> ExternalsPolicy {
    let mut allowlist = params.default_externals.clone();
    for module in &params.target.exclude_modules {
        if !allowlist.contains(module) {
            allowlist.push(module.clone());
        }
    }
    ExternalsPolicy::new(&params.package, allowlist, !mode.is_production())
}

/// Path of the compiled primary entry inside the build folder
fn compiled_entry(params: &ConfigurationParams) -> PathBuf {
    let name = params
        .primary_entry()
        .map_or(params.target.name.as_str(), |(name, _)| name.as_str());
    params
        .target
        .build_folder
        .join(params.output.script.replace("[name]", name))
}
