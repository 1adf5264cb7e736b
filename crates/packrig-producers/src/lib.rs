//! Bundler configuration producers.
//!
//! A [`ProducerRegistry`] wires six producers over one shared
//! [`ReducerPipeline`](packrig_reducer::ReducerPipeline):
//!
//! - [`RulesConfig`] builds module rules category by category
//! - [`BaseConfig`] adds resolution settings and the rules
//! - four environment producers (node/browser × development/production)
//!   extend the base configuration
//!
//! Every producer reduces its value through named extension points (see
//! [`points`]) so handlers registered at start-up can adjust any part of the
//! output.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use packrig_config::{ConfigurationParams, Environment, Mode, Target};
//! use packrig_producers::{Plugin, ProducerRegistry, points};
//! use packrig_reducer::ReducerPipeline;
//!
//! let pipeline = ReducerPipeline::builder()
//!     .on(points::BROWSER_CONFIG, |mut config: packrig_producers::BundlerConfig, _: &ConfigurationParams| {
//!         config.plugins.push(Plugin::Custom {
//!             id: "bundle-report".into(),
//!             options: serde_json::Value::Null,
//!         });
//!         Ok(config)
//!     })
//!     .build();
//!
//! let registry = ProducerRegistry::new(Arc::new(pipeline), None);
//! let target = Target::new("web", Environment::Browser).with_entry("main", ["./src/index.js"]);
//! let config = registry
//!     .build(&ConfigurationParams::new(target), Mode::Production)
//!     .unwrap();
//!
//! assert_eq!(config.plugins.last().unwrap().name(), "custom");
//! ```

pub mod base;
pub mod browser;
pub mod config_file;
pub mod error;
pub mod node;
pub mod points;
pub mod registry;
pub mod rules;
pub mod schema;

pub use base::BaseConfig;
pub use browser::{BrowserDevelopmentConfig, BrowserProductionConfig};
pub use config_file::{ConfigFile, OverrideLocator};
pub use error::{ProducerError, Result};
pub use node::{NodeDevelopmentConfig, NodeProductionConfig};
pub use points::RuleCategory;
pub use registry::{ProducerRegistry, Registered, SharedProducer, variant_key};
pub use rules::{RuleSet, RulesConfig};
pub use schema::{
    BundlerConfig, Condition, DevServerConfig, ExecutionTarget, ExternalsPolicy, LoaderUse,
    ModuleConfig, NodeOptions, Output, Plugin, Resolve, Rule,
};
