//! Graceful shutdown signalling.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Fans a shutdown signal out to the serve loop and all live sessions.
///
/// Sessions run on child tokens, so cancelling here reaches every
/// connection; a session can cancel its own child without affecting the
/// rest of the server.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Get a clone of the cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Initiate shutdown.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal shutdown and wait for the serve task to drain.
    ///
    /// The serve loop stops accepting once the token fires and finishes its
    /// open connections; if that takes longer than `timeout` a warning is
    /// logged and the task is left to the runtime.
    pub async fn graceful_shutdown(&self, serve_task: JoinHandle<()>, timeout: Duration) {
        self.shutdown();
        info!(timeout_secs = timeout.as_secs(), "waiting for server to drain");

        match tokio::time::timeout(timeout, serve_task).await {
            Ok(Ok(())) => info!("server stopped"),
            Ok(Err(e)) => warn!(error = %e, "serve task failed during shutdown"),
            Err(_) => warn!("server did not stop within {timeout:?}"),
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
