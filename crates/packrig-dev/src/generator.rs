//! Dev middleware for one (build target, serve target) pair.
//!
//! The generator produces the build target's development configuration,
//! hands it to the bundler, and taps the resulting compiler so it can expose
//! the compiled output once the first compile succeeds.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::Shared;
use packrig_config::{ConfigurationParams, Mode, SettingsStore, Target};
use packrig_producers::{BundlerConfig, ProducerRegistry};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::bundler::{Bundler, Compiler};
use crate::error::{DevError, Result};
use crate::filesystem::SharedFileSystem;
use crate::hooks::{CompilerHooks, CompilerPlugin, SharedPlugin};
use crate::middleware::{DevState, HotEvent, dev_router, hot_router};

/// Resolves to the compiled output after the first successful compile.
///
/// Fails with [`oneshot::Canceled`] only if the compiler is dropped before
/// any compile succeeded.
pub type FileSystemFuture = Shared<oneshot::Receiver<SharedFileSystem>>;

/// Builds an axum router to mount on the caller's server
pub type MiddlewareFactory = Box<dyn Fn() -> Router + Send + Sync>;

const HOT_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uncompiled,
    Compiling,
    Compiled,
}

/// Tracks compile progress and publishes the filesystem once.
struct FileSystemPlugin {
    phase: Arc<RwLock<Phase>>,
    sender: Arc<Mutex<Option<oneshot::Sender<SharedFileSystem>>>>,
    events: broadcast::Sender<HotEvent>,
}

impl CompilerPlugin for FileSystemPlugin {
    fn name(&self) -> &str {
        "packrig-file-system"
    }

    fn apply(&self, hooks: &CompilerHooks) {
        let phase = self.phase.clone();
        let events = self.events.clone();
        hooks.compile.tap(self.name(), move |_| {
            *phase.write() = Phase::Compiling;
            debug!("compile started");
            // No subscribers is fine
            let _ = events.send(HotEvent::Building);
        });

        let phase = self.phase.clone();
        let sender = self.sender.clone();
        let events = self.events.clone();
        hooks.done.tap(self.name(), move |outcome| {
            *phase.write() = Phase::Compiled;

            if outcome.succeeded() {
                if let Some(sender) = sender.lock().take() {
                    info!("first compile finished, serving output");
                    let _ = sender.send(outcome.file_system.clone());
                } else {
                    debug!("compile finished");
                }
            } else {
                warn!(errors = outcome.error_count, "compile finished with errors");
            }

            let _ = events.send(HotEvent::Built {
                errors: outcome.error_count,
            });
        });
    }
}

pub struct DevMiddleware {
    build: Target,
    serve: Target,
    config: BundlerConfig,
    compiler: Arc<dyn Compiler>,
    phase: Arc<RwLock<Phase>>,
    file_system: FileSystemFuture,
    events: broadcast::Sender<HotEvent>,
    watching: Arc<AtomicBool>,
    watch_failed: Arc<AtomicBool>,
}

impl DevMiddleware {
    /// Wire a compiler for `build`, serving from `serve`'s build folder.
    ///
    /// # Errors
    ///
    /// [`DevError::TargetNotFound`] if either name is unknown, checked before
    /// any configuration is produced. Producer and bundler failures are
    /// propagated.
    pub fn new(
        settings: &dyn SettingsStore,
        registry: &ProducerRegistry,
        bundler: &dyn Bundler,
        build: &str,
        serve: &str,
    ) -> Result<Self> {
        let build_target = settings.require_target(build)?.clone();
        let serve_target = settings.require_target(serve)?.clone();

        let params = ConfigurationParams::for_target(
            &build_target,
            settings.project(),
            Mode::Development,
            None,
        );
        let config = registry.build(&params, Mode::Development)?;

        let (sender, receiver) = oneshot::channel();
        let phase = Arc::new(RwLock::new(Phase::Uncompiled));
        let (events, _) = broadcast::channel(HOT_EVENT_CAPACITY);

        let plugin: SharedPlugin = Arc::new(FileSystemPlugin {
            phase: phase.clone(),
            sender: Arc::new(Mutex::new(Some(sender))),
            events: events.clone(),
        });
        let compiler = bundler
            .compiler(&config, vec![plugin])
            .map_err(|err| DevError::Bundler(err.into()))?;

        info!(build, serve, "dev middleware ready");
        Ok(Self {
            build: build_target,
            serve: serve_target,
            config,
            compiler,
            phase,
            file_system: receiver.shared(),
            events,
            watching: Arc::new(AtomicBool::new(false)),
            watch_failed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Router factories to mount: none when the build target runs its own
    /// dev server, the dev middleware otherwise, plus the hot middleware when
    /// the build target is hot.
    pub fn middleware(&self) -> Vec<MiddlewareFactory> {
        if self.build.integrated_dev_server().is_some() {
            debug!(target_name = %self.build.name, "integrated dev server in use, no middleware");
            return Vec::new();
        }

        let state = DevState {
            compiler: self.compiler.clone(),
            file_system: self.file_system.clone(),
            public_path: self.public_path().to_string(),
            watch_failed: self.watch_failed.clone(),
        };
        let watching = self.watching.clone();

        let dev: MiddlewareFactory = Box::new(move || {
            if !watching.swap(true, Ordering::SeqCst) {
                match state.compiler.watch() {
                    Ok(()) => state.watch_failed.store(false, Ordering::SeqCst),
                    Err(err) => {
                        error!(error = %err, "failed to start watching");
                        state.watch_failed.store(true, Ordering::SeqCst);
                        watching.store(false, Ordering::SeqCst);
                    }
                }
            }
            dev_router(state.clone())
        });
        let mut factories = vec![dev];

        if self.build.hot {
            let events = self.events.clone();
            factories.push(Box::new(move || hot_router(events.clone())));
        }

        factories
    }

    /// The serve target's output directory
    pub fn directory(&self) -> &Path {
        &self.serve.build_folder
    }

    /// The compiled output, once the first compile succeeds. Every call
    /// returns a handle to the same shared future.
    pub fn file_system(&self) -> FileSystemFuture {
        self.file_system.clone()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn config(&self) -> &BundlerConfig {
        &self.config
    }

    pub fn build_target(&self) -> &Target {
        &self.build
    }

    pub fn serve_target(&self) -> &Target {
        &self.serve
    }

    /// Public path from the produced configuration, falling back to the
    /// target's.
    fn public_path(&self) -> &str {
        self.config
            .output
            .as_ref()
            .and_then(|output| output.public_path.as_deref())
            .unwrap_or(&self.build.public_path)
    }
}
