use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Quiet period for search-as-you-type.
pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Runs the most recently scheduled task once input has been quiet for a while.
///
/// Scheduling aborts whatever was scheduled before, whether it is still
/// waiting or already running. Dropping the debouncer aborts the pending task.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quiet = self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a scheduled task has neither finished nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_QUIET_PERIOD)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
