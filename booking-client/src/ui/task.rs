//! Background tasks tied to a view model's lifetime.

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handed to a task so it can notice it should stop.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once the owning [`ScopedTask`] is cancelled or dropped.
    pub async fn cancelled(&mut self) {
        // An error means the sender is gone, which also means stop
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// A spawned task that is told to stop when its owner says so.
///
/// The task is expected to select on [`CancelSignal::cancelled`] and end
/// its own loop; it is never aborted from outside. Dropping the handle
/// cancels it too.
pub struct ScopedTask {
    name: &'static str,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ScopedTask {
    pub fn spawn<F, Fut>(name: &'static str, task: F) -> Self
    where
        F: FnOnce(CancelSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel, rx) = watch::channel(false);
        let handle = tokio::spawn(task(CancelSignal { rx }));
        debug!(task = name, "started");
        Self {
            name,
            cancel,
            handle,
        }
    }

    /// Ask the task to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Cancel the task and wait for it to end.
    pub async fn shutdown(self) {
        self.cancel();
        match self.handle.await {
            Ok(()) => debug!(task = self.name, "stopped"),
            Err(e) => warn!(task = self.name, error = %e, "task ended abnormally"),
        }
    }
}
