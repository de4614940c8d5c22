//! Composes the server with its shutdown sources (the `stop` command and
//! OS termination signals) and runs cleanup exactly once on the way out.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;

use crate::lifecycle::{self, LifecycleError};
use crate::server::{Server, ServerError};

/// A one-shot, idempotent shutdown signal. Any number of callers may
/// invoke `stop()`; only the first has an effect, and every waiter is
/// woken exactly once.
pub struct Stopper {
    notify: Notify,
    stopped: AtomicBool,
}

impl Stopper {
    pub fn new() -> Self {
        Stopper {
            notify: Notify::new(),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Resolves immediately if already stopped, otherwise waits for the
    /// next `stop()` call.
    pub async fn wait(&self) {
        if self.is_stopped() {
            return;
        }
        let notified = self.notify.notified();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("cleanup error: {0}")]
    Cleanup(#[from] LifecycleError),
}

/// Runs `server` to completion, racing its own accept loop against SIGINT,
/// SIGTERM, and `stop`, then always runs `Cleanup` regardless of which
/// source triggered shutdown.
pub struct Runtime {
    pub pid_path: PathBuf,
    pub socket_path: PathBuf,
    pub stop: Arc<Stopper>,
}

impl Runtime {
    pub fn new(pid_path: PathBuf, socket_path: PathBuf, stop: Arc<Stopper>) -> Self {
        Runtime {
            pid_path,
            socket_path,
            stop,
        }
    }

    pub async fn run(self, server: Server) -> Result<(), RuntimeError> {
        let stop_for_signals = self.stop.clone();
        let signal_task = tokio::spawn(async move {
            watch_signals(stop_for_signals).await;
        });

        let serve_result = server.serve(self.stop.clone()).await;
        signal_task.abort();

        let cleanup_result = lifecycle::cleanup(&self.pid_path, &self.socket_path);

        serve_result?;
        cleanup_result?;
        Ok(())
    }
}

async fn watch_signals(stop: Arc<Stopper>) {
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(_) => return,
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(_) => return,
    };

    tokio::select! {
        _ = sigint.recv() => stop.stop(),
        _ = sigterm.recv() => stop.stop(),
        _ = stop.wait() => {}
    }
}
