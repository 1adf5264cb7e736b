//! The producer contract.
//!
//! A producer builds one kind of configuration from [`ConfigurationParams`].
//! It may extend another producer, in which case its own output is merged
//! over the output of the one it extends, and it may name an override file
//! that is applied last.

use std::path::PathBuf;

use packrig_config::{ConfigurationParams, Mode, OverrideFile, merge_configs};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ProducerError, Result};

pub trait ConfigFile: Send + Sync {
    type Output: Serialize + DeserializeOwned;

    /// Registry key, e.g. `config.browser.production`
    fn key(&self) -> &'static str;

    /// Build this producer's own contribution.
    fn create_config(&self, params: &ConfigurationParams) -> Result<Self::Output>;

    /// The producer whose output this one is merged over
    fn extends(&self) -> Option<&dyn ConfigFile<Output = Self::Output>> {
        None
    }

    /// Stem of the user override file for these params, without extension
    fn override_path(&self, _params: &ConfigurationParams) -> Option<PathBuf> {
        None
    }

    /// Full configuration: `create_config`, merged over the extended
    /// producer's configuration, with the override file applied.
    ///
    /// # Errors
    ///
    /// Propagates errors from `create_config`, from the extended producer and
    /// from loading the override file. Returns [`ProducerError::Shape`] when
    /// the merged document cannot be read back as `Self::Output`.
    #[instrument(level = "debug", skip_all, fields(producer = self.key(), target_name = %params.target.name))]
    fn get_config(&self, params: &ConfigurationParams) -> Result<Self::Output> {
        let created = self.create_config(params)?;
        let base = self.extends();
        let override_file = match self.override_path(params) {
            Some(stem) => OverrideFile::locate(&stem)?,
            None => None,
        };

        if base.is_none() && override_file.is_none() {
            return Ok(created);
        }

        let mut document = self.to_document(&created)?;

        if let Some(base) = base {
            let base_document = self.to_document(&base.get_config(params)?)?;
            document = merge_configs(base_document, document);
        }

        if let Some(file) = override_file {
            debug!(path = %file.path().display(), "applying override file");
            document = file.apply(document);
        }

        serde_json::from_value(document).map_err(|source| ProducerError::Shape {
            producer: self.key(),
            source,
        })
    }

    #[doc(hidden)]
    fn to_document(&self, config: &Self::Output) -> Result<Value> {
        serde_json::to_value(config).map_err(|source| ProducerError::Shape {
            producer: self.key(),
            source,
        })
    }
}

/// Resolves override file stems as `<dir>/<target>.<environment>.<mode>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideLocator {
    dir: Option<PathBuf>,
}

impl OverrideLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// No override files are ever applied
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn stem(&self, params: &ConfigurationParams, mode: Mode) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let target = &params.target;
        Some(dir.join(format!(
            "{}.{}.{}",
            target.name, target.environment, mode
        )))
    }
}
