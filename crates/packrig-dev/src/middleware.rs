//! HTTP surface of the dev middleware.
//!
//! The dev router serves compiled files from the virtual filesystem and
//! accepts rebuild requests; the hot router streams compile events to
//! browsers over server-sent events.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::bundler::Compiler;
use crate::filesystem::content_type;
use crate::generator::FileSystemFuture;

/// `POST` here schedules a rebuild
pub const BUILD_ROUTE: &str = "/__packrig/build";
/// Server-sent compile events
pub const HOT_ROUTE: &str = "/__packrig/hmr";

/// Events pushed to hot clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotEvent {
    Building,
    Built { errors: usize },
}

impl HotEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HotEvent::Building => "building",
            HotEvent::Built { .. } => "built",
        }
    }
}

#[derive(Clone)]
pub(crate) struct DevState {
    pub compiler: Arc<dyn Compiler>,
    pub file_system: FileSystemFuture,
    pub public_path: String,
    /// Set while the compiler failed to start watching
    pub watch_failed: Arc<AtomicBool>,
}

pub(crate) fn dev_router(state: DevState) -> Router {
    Router::new()
        .route(BUILD_ROUTE, post(trigger_build))
        .fallback(serve_file)
        .with_state(state)
}

pub(crate) fn hot_router(events: broadcast::Sender<HotEvent>) -> Router {
    Router::new()
        .route(HOT_ROUTE, get(hot_events))
        .with_state(events)
}

async fn trigger_build(State(state): State<DevState>) -> StatusCode {
    debug!("rebuild requested");
    state.compiler.invalidate();
    StatusCode::ACCEPTED
}

/// Serve a compiled file, waiting for the first successful compile.
async fn serve_file(State(state): State<DevState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let Some(relative) = strip_public_path(uri.path(), &state.public_path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if state.watch_failed.load(Ordering::SeqCst) && state.file_system.peek().is_none() {
        warn!("compiler is not watching, no build to serve");
        return (StatusCode::SERVICE_UNAVAILABLE, "compiler is not watching").into_response();
    }

    let file_system = match state.file_system.clone().await {
        Ok(file_system) => file_system,
        Err(_) => {
            warn!("compiler stopped before the first successful build");
            return (StatusCode::SERVICE_UNAVAILABLE, "no build available").into_response();
        }
    };

    let path = if relative.is_empty() || relative.ends_with('/') {
        format!("{relative}index.html")
    } else {
        relative.to_string()
    };

    match file_system.read(&path) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, content_type(&path)),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            content,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn hot_events(
    State(events): State<broadcast::Sender<HotEvent>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(events.subscribe()).filter_map(|event| {
        let event = event.ok()?;
        Event::default()
            .event(event.name())
            .json_data(&event)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// `/assets/main.js` under `/assets/` -> `main.js`. Public paths that are not
/// absolute paths (e.g. a CDN URL) are served from the root.
fn strip_public_path<'a>(path: &'a str, public_path: &str) -> Option<&'a str> {
    let prefix = public_path.trim_end_matches('/');
    let prefix = if prefix.starts_with('/') { prefix } else { "" };

    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('/')
}
