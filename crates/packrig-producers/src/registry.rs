//! Producer registry.
//!
//! Producers are wired once at start-up and looked up by key afterwards. The
//! registry owns the wiring; replacing an entry is how a caller swaps in a
//! different producer for one variant.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use packrig_config::{ConfigurationParams, Environment, Mode};
use packrig_reducer::ReducerPipeline;
use tracing::debug;

use crate::base::BaseConfig;
use crate::browser::{BrowserDevelopmentConfig, BrowserProductionConfig};
use crate::config_file::{ConfigFile, OverrideLocator};
use crate::error::{ProducerError, Result};
use crate::node::{NodeDevelopmentConfig, NodeProductionConfig};
use crate::rules::RulesConfig;
use crate::schema::BundlerConfig;

pub type SharedProducer = Arc<dyn ConfigFile<Output = BundlerConfig>>;

/// A producer looked up by key.
///
/// The rules producer yields a [`RuleSet`](crate::RuleSet) rather than a full
/// configuration, so it is kept apart from the others.
#[derive(Clone)]
pub enum Registered {
    Rules(Arc<RulesConfig>),
    Config(SharedProducer),
}

impl Registered {
    pub fn key(&self) -> &'static str {
        match self {
            Registered::Rules(rules) => rules.key(),
            Registered::Config(producer) => producer.key(),
        }
    }

    pub fn into_config(self) -> Option<SharedProducer> {
        match self {
            Registered::Config(producer) => Some(producer),
            Registered::Rules(_) => None,
        }
    }

    pub fn into_rules(self) -> Option<Arc<RulesConfig>> {
        match self {
            Registered::Rules(rules) => Some(rules),
            Registered::Config(_) => None,
        }
    }
}

impl std::fmt::Debug for Registered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Registered").field(&self.key()).finish()
    }
}

/// Registry keys of the built-in producers
pub mod keys {
    use super::*;

    pub const RULES: &str = RulesConfig::KEY;
    pub const BASE: &str = BaseConfig::KEY;
    pub const NODE_DEVELOPMENT: &str = NodeDevelopmentConfig::KEY;
    pub const NODE_PRODUCTION: &str = NodeProductionConfig::KEY;
    pub const BROWSER_DEVELOPMENT: &str = BrowserDevelopmentConfig::KEY;
    pub const BROWSER_PRODUCTION: &str = BrowserProductionConfig::KEY;
}

/// Key of the producer for one environment and mode
pub fn variant_key(environment: Environment, mode: Mode) -> &'static str {
    match (environment, mode) {
        (Environment::Node, Mode::Development) => keys::NODE_DEVELOPMENT,
        (Environment::Node, Mode::Production) => keys::NODE_PRODUCTION,
        (Environment::Browser, Mode::Development) => keys::BROWSER_DEVELOPMENT,
        (Environment::Browser, Mode::Production) => keys::BROWSER_PRODUCTION,
    }
}

pub struct ProducerRegistry {
    pipeline: Arc<ReducerPipeline>,
    rules: Arc<RulesConfig>,
    producers: IndexMap<&'static str, SharedProducer>,
}

impl ProducerRegistry {
    /// Wire the rules, base and four environment producers.
    ///
    /// `override_dir` is where override files are looked up; `None` disables
    /// them.
    pub fn new(pipeline: Arc<ReducerPipeline>, override_dir: Option<PathBuf>) -> Self {
        let overrides = override_dir.map_or_else(OverrideLocator::disabled, OverrideLocator::new);
        let rules = Arc::new(RulesConfig::new(pipeline.clone()));
        let base = Arc::new(BaseConfig::new(pipeline.clone(), rules.clone()));

        let mut registry = Self {
            pipeline: pipeline.clone(),
            rules,
            producers: IndexMap::new(),
        };
        registry.register(base.clone());
        registry.register(Arc::new(NodeDevelopmentConfig::new(
            pipeline.clone(),
            base.clone(),
            overrides.clone(),
        )));
        registry.register(Arc::new(NodeProductionConfig::new(
            pipeline.clone(),
            base.clone(),
            overrides.clone(),
        )));
        registry.register(Arc::new(BrowserDevelopmentConfig::new(
            pipeline.clone(),
            base.clone(),
            overrides.clone(),
        )));
        registry.register(Arc::new(BrowserProductionConfig::new(pipeline, base, overrides)));
        registry
    }

    /// Register `producer` under its own key, replacing any previous one.
    pub fn register(&mut self, producer: SharedProducer) -> &mut Self {
        let key = producer.key();
        if self.producers.insert(key, producer).is_some() {
            debug!(key, "replaced producer");
        }
        self
    }

    pub fn pipeline(&self) -> &Arc<ReducerPipeline> {
        &self.pipeline
    }

    pub fn rules(&self) -> &Arc<RulesConfig> {
        &self.rules
    }

    /// Look up any producer, the rules producer included.
    pub fn get(&self, key: &str) -> Option<Registered> {
        if key == keys::RULES {
            return Some(Registered::Rules(self.rules.clone()));
        }
        self.producers.get(key).cloned().map(Registered::Config)
    }

    /// # Errors
    ///
    /// Returns [`ProducerError::UnknownProducer`] when nothing is registered
    /// under `key`.
    pub fn require(&self, key: &str) -> Result<Registered> {
        self.get(key)
            .ok_or_else(|| ProducerError::UnknownProducer(key.to_string()))
    }

    /// Configuration producer under `key`. The rules producer is not one.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::UnknownProducer`] when no configuration
    /// producer is registered under `key`.
    pub fn config_producer(&self, key: &str) -> Result<SharedProducer> {
        self.producers
            .get(key)
            .cloned()
            .ok_or_else(|| ProducerError::UnknownProducer(key.to_string()))
    }

    /// Keys in registration order. Every key resolves through [`Self::get`].
    pub fn keys(&self) -> Vec<&'static str> {
        let mut all = vec![keys::RULES];
        all.extend(self.producers.keys().copied());
        all
    }

    /// Producer for the environment of `params.target` and `mode`.
    pub fn producer_for(&self, environment: Environment, mode: Mode) -> Result<SharedProducer> {
        self.config_producer(variant_key(environment, mode))
    }

    /// Build the full configuration for `params` in `mode`.
    pub fn build(&self, params: &ConfigurationParams, mode: Mode) -> Result<BundlerConfig> {
        self.producer_for(params.target.environment, mode)?
            .get_config(params)
    }
}

impl std::fmt::Debug for ProducerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerRegistry")
            .field("producers", &self.keys())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
