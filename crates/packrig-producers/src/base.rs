//! Configuration shared by every environment and mode.

use std::sync::Arc;

use packrig_config::ConfigurationParams;
use packrig_reducer::ReducerPipeline;

use crate::config_file::ConfigFile;
use crate::error::Result;
use crate::points;
use crate::rules::RulesConfig;
use crate::schema::{BundlerConfig, ModuleConfig, Resolve};

pub const RESOLVE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".json"];

pub struct BaseConfig {
    pipeline: Arc<ReducerPipeline>,
    rules: Arc<RulesConfig>,
}

impl BaseConfig {
    pub const KEY: &'static str = "config.base";

    pub fn new(pipeline: Arc<ReducerPipeline>, rules: Arc<RulesConfig>) -> Self {
        Self { pipeline, rules }
    }
}

impl ConfigFile for BaseConfig {
    type Output = BundlerConfig;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn create_config(&self, params: &ConfigurationParams) -> Result<BundlerConfig> {
        let rules = self.rules.get_config(params)?.rules;
        let target = &params.target;

        let config = BundlerConfig {
            module: Some(ModuleConfig { rules }),
            resolve: Some(Resolve {
                extensions: RESOLVE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
                modules: vec![
                    target.src_folder.to_string_lossy().into_owned(),
                    "node_modules".to_string(),
                ],
            }),
            ..BundlerConfig::default()
        };

        let config = self.pipeline.reduce(
            points::base_config_for(target.environment),
            config,
            params,
        )?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packrig_config::{Environment, Target};

    #[test]
    fn resolves_sources_before_node_modules() {
        let pipeline = Arc::new(ReducerPipeline::empty());
        let base = BaseConfig::new(pipeline.clone(), Arc::new(RulesConfig::new(pipeline)));
        let params = ConfigurationParams::new(
            Target::new("web", Environment::Browser).with_entry("main", ["./src/index.js"]),
        );

        let config = base.get_config(&params).unwrap();
        let resolve = config.resolve.unwrap();
        assert_eq!(resolve.extensions, vec![".js", ".jsx", ".json"]);
        assert_eq!(resolve.modules, vec!["src", "node_modules"]);
        assert!(!config.module.unwrap().rules.is_empty());
    }

    #[test]
    fn environment_handler_sees_base_config() {
        let pipeline = Arc::new(
            ReducerPipeline::builder()
                .on(
                    points::BASE_CONFIG_FOR_NODE,
                    |mut config: BundlerConfig, _: &ConfigurationParams| {
                        config.devtool = Some("inline-source-map".to_string());
                        Ok(config)
                    },
                )
                .build(),
        );
        let base = BaseConfig::new(pipeline.clone(), Arc::new(RulesConfig::new(pipeline)));

        let node = ConfigurationParams::new(
            Target::new("api", Environment::Node).with_entry("server", ["./src/server.js"]),
        );
        let browser = ConfigurationParams::new(
            Target::new("web", Environment::Browser).with_entry("main", ["./src/index.js"]),
        );

        assert_eq!(
            base.get_config(&node).unwrap().devtool.as_deref(),
            Some("inline-source-map")
        );
        assert_eq!(base.get_config(&browser).unwrap().devtool, None);
    }
}
