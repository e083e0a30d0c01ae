//! Cooperative shutdown signal shared by the stream tasks

use tokio_util::sync::CancellationToken;

/// Shared stop flag for one streaming session.
///
/// False at session start; `stop` flips it exactly once and it never reverts.
/// Clones observe the same flag, so a handle can be passed to a signal
/// handler or another task while the session runs.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    token: CancellationToken,
}

impl ShutdownFlag {
    /// Create a flag in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent and callable from any task.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// True once `stop` has been called
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once `stop` has been called
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }
}
