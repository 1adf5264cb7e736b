//! Development middleware for packrig.
//!
//! [`DevMiddleware`] wires a bundler's watch compiler to axum routers that an
//! existing HTTP server mounts. It serves compiled output from the
//! compiler's virtual filesystem, accepts rebuild requests, and streams
//! compile events to hot clients.

pub mod bundler;
pub mod error;
pub mod filesystem;
pub mod generator;
pub mod hooks;
pub mod middleware;

pub use bundler::{Bundler, Compiler};
pub use error::{DevError, Result};
pub use filesystem::{MemoryFileSystem, SharedFileSystem, VirtualFileSystem, content_type};
pub use generator::{DevMiddleware, FileSystemFuture, MiddlewareFactory, Phase};
pub use hooks::{CompileOutcome, CompilerHooks, CompilerPlugin, Hook, SharedPlugin};
pub use middleware::{BUILD_ROUTE, HOT_ROUTE, HotEvent};
