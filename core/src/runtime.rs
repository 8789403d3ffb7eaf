//! Task spawning abstraction for runtime independence.
//!
//! Lets the dispatch core (component F) hand off a potentially-blocking
//! sink delivery to a background task without tying the library to a
//! specific async runtime or requiring the HTTP handler to await it.

use std::future::Future;

/// Abstraction for spawning background tasks.
pub trait TaskSpawner: Send + Sync {
    /// Spawns a future as a background task. The task runs independently of
    /// the caller; the spawner provides no way to cancel or join it.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Tokio-based spawner, the default for the standalone server.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Creates a new `TokioSpawner` with the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Creates a new `TokioSpawner` using the current runtime's handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn tokio_spawner_executes_task() {
        let spawner = TokioSpawner::current();
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = executed.clone();

        spawner.spawn(async move {
            executed_clone.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(executed.load(Ordering::SeqCst));
    }
}
