//! Compiler lifecycle hooks.
//!
//! A [`Hook`] is an ordered list of named taps. Compilers call the hooks, and
//! [`CompilerPlugin`]s tap them when they are applied.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::filesystem::SharedFileSystem;

type Tap<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct Hook<T> {
    name: &'static str,
    taps: RwLock<Vec<(String, Tap<T>)>>,
}

impl<T> Hook<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            taps: RwLock::new(Vec::new()),
        }
    }

    /// Add a tap, called after the taps already registered.
    pub fn tap(&self, plugin: impl Into<String>, tap: impl Fn(&T) + Send + Sync + 'static) {
        let plugin = plugin.into();
        trace!(hook = self.name, plugin = %plugin, "tapping hook");
        self.taps.write().push((plugin, Arc::new(tap)));
    }

    /// Run every tap registered so far. Taps added while the hook runs are
    /// first called on the next `call`.
    pub fn call(&self, value: &T) {
        let taps: Vec<Tap<T>> = self.taps.read().iter().map(|(_, tap)| tap.clone()).collect();
        for tap in taps {
            tap(value);
        }
    }

    pub fn len(&self) -> usize {
        self.taps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.read().is_empty()
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let taps = self.taps.read();
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("taps", &taps.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

/// Result of one compile, passed to the `done` hook
#[derive(Clone)]
pub struct CompileOutcome {
    /// Where the compiler wrote its output
    pub file_system: SharedFileSystem,
    pub error_count: usize,
}

impl CompileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error_count == 0
    }
}

impl fmt::Debug for CompileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOutcome")
            .field("error_count", &self.error_count)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct CompilerHooks {
    /// A compile is starting
    pub compile: Hook<()>,
    /// A compile finished, successfully or not
    pub done: Hook<CompileOutcome>,
}

impl CompilerHooks {
    pub fn new() -> Self {
        Self {
            compile: Hook::new("compile"),
            done: Hook::new("done"),
        }
    }
}

impl Default for CompilerHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// Something that taps compiler hooks
pub trait CompilerPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, hooks: &CompilerHooks);
}

pub type SharedPlugin = Arc<dyn CompilerPlugin>;
