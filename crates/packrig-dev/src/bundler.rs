//! The bundler collaborator.
//!
//! packrig does not compile anything itself. A [`Bundler`] turns a
//! [`BundlerConfig`] into a [`Compiler`] that runs the actual build.

use std::sync::Arc;

use packrig_producers::BundlerConfig;

use crate::hooks::{CompilerHooks, SharedPlugin};

pub trait Bundler: Send + Sync {
    /// Create a compiler for `config` with `plugins` applied to its hooks.
    fn compiler(
        &self,
        config: &BundlerConfig,
        plugins: Vec<SharedPlugin>,
    ) -> anyhow::Result<Arc<dyn Compiler>>;
}

pub trait Compiler: Send + Sync {
    fn hooks(&self) -> &CompilerHooks;

    /// Start watching sources, compiling on every change.
    fn watch(&self) -> anyhow::Result<()>;

    /// Schedule a recompile.
    fn invalidate(&self);
}
