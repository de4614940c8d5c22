//! The pull interface an external GUI renderer would consume. No such
//! renderer ships here; `NullRenderSink` exists so the seam is exercised
//! even when nothing is linked against it.

use std::sync::Arc;

use async_trait::async_trait;
use pxd_core::history::History;
use tokio::sync::Mutex;

use crate::runtime::Stopper;

/// A collaborator that observes the canvas via `dirty()`/`render_snapshot()`
/// and renders it somewhere (a window, a framebuffer, a remote display).
/// Implementations must return once `stop` fires.
#[async_trait]
pub trait RenderSink: Send {
    async fn run(self: Box<Self>, history: Arc<Mutex<History>>, stop: Arc<Stopper>);
}

/// The no-op renderer. Waits for shutdown and returns; never reads the
/// canvas. Matches the stub renderer run alongside a headless daemon.
pub struct NullRenderSink;

#[async_trait]
impl RenderSink for NullRenderSink {
    async fn run(self: Box<Self>, _history: Arc<Mutex<History>>, stop: Arc<Stopper>) {
        stop.wait().await;
    }
}
