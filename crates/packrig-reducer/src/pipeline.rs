//! Reducer pipeline with named extension points.
//!
//! Handlers register during start-up through [`ReducerPipelineBuilder`]. Once
//! [`ReducerPipelineBuilder::build`] returns, the mapping is frozen and
//! [`ReducerPipeline::reduce`] only reads it, so a single pipeline can be
//! shared behind an `Arc` by every producer and every concurrent build.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::error::{ReduceError, Result};
use crate::names::Names;

type HandlerFn<V, C> = dyn Fn(V, &C) -> anyhow::Result<V> + Send + Sync;

/// A type-erased handler. `func` always holds a `Box<HandlerFn<V, C>>`.
struct RegisteredHandler {
    signature: String,
    func: Box<dyn Any + Send + Sync>,
}

impl RegisteredHandler {
    fn new<V, C, F>(handler: F) -> Self
    where
        V: 'static,
        C: 'static,
        F: Fn(V, &C) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        let boxed: Box<HandlerFn<V, C>> = Box::new(handler);
        Self {
            signature: signature::<V, C>(),
            func: Box::new(boxed),
        }
    }
}

fn signature<V, C>() -> String {
    format!("({}, &{})", type_name::<V>(), type_name::<C>())
}

/// Collects handlers before the pipeline is frozen.
#[derive(Default)]
pub struct ReducerPipelineBuilder {
    handlers: HashMap<String, Vec<RegisteredHandler>>,
}

impl ReducerPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `point`, after any handler already registered
    /// there.
    pub fn on<V, C, F>(mut self, point: impl Into<String>, handler: F) -> Self
    where
        V: 'static,
        C: 'static,
        F: Fn(V, &C) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.register(point, handler);
        self
    }

    /// In-place variant of [`ReducerPipelineBuilder::on`].
    pub fn register<V, C, F>(&mut self, point: impl Into<String>, handler: F) -> &mut Self
    where
        V: 'static,
        C: 'static,
        F: Fn(V, &C) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        let point = point.into();
        trace!(point = %point, signature = %signature::<V, C>(), "registering reducer handler");
        self.handlers
            .entry(point)
            .or_default()
            .push(RegisteredHandler::new(handler));
        self
    }

    pub fn build(self) -> ReducerPipeline {
        ReducerPipeline {
            handlers: self.handlers,
        }
    }
}

/// Frozen mapping from extension-point name to ordered handlers.
pub struct ReducerPipeline {
    handlers: HashMap<String, Vec<RegisteredHandler>>,
}

impl ReducerPipeline {
    pub fn builder() -> ReducerPipelineBuilder {
        ReducerPipelineBuilder::new()
    }

    /// A pipeline with no handlers; every reduction is the identity.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Fold `value` through every handler registered under each of `names`,
    /// left to right.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::Handler`] as soon as a handler fails and
    /// [`ReduceError::TypeMismatch`] when a handler was registered for another
    /// value or context type. No partial value is returned in either case.
    pub fn reduce<'n, V, C>(&self, names: impl Into<Names<'n>>, value: V, context: &C) -> Result<V>
    where
        V: 'static,
        C: 'static,
    {
        let names = names.into();
        let mut value = value;
        for point in names.iter() {
            value = self.reduce_point(point, value, context)?;
        }
        Ok(value)
    }

    fn reduce_point<V, C>(&self, point: &str, value: V, context: &C) -> Result<V>
    where
        V: 'static,
        C: 'static,
    {
        let Some(handlers) = self.handlers.get(point) else {
            trace!(point, "no handlers registered");
            return Ok(value);
        };

        debug!(point, handlers = handlers.len(), "reducing through extension point");

        let mut value = value;
        for (index, handler) in handlers.iter().enumerate() {
            let func = handler
                .func
                .downcast_ref::<Box<HandlerFn<V, C>>>()
                .ok_or_else(|| ReduceError::TypeMismatch {
                    point: point.to_string(),
                    expected: signature::<V, C>(),
                    registered: handler.signature.clone(),
                })?;

            value = func(value, context).map_err(|source| ReduceError::Handler {
                point: point.to_string(),
                index,
                source,
            })?;
        }

        Ok(value)
    }

    /// Number of handlers registered under `point`.
    pub fn handler_count(&self, point: &str) -> usize {
        self.handlers.get(point).map_or(0, Vec::len)
    }

    /// Names with at least one handler, sorted.
    pub fn points(&self) -> Vec<&str> {
        let mut points: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        points.sort_unstable();
        points
    }
}

impl Default for ReducerPipeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ReducerPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for point in self.points() {
            map.entry(&point, &self.handler_count(point));
        }
        map.finish()
    }
}
