//! Cancellable handle for live position updates.

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::task::JoinHandle;

use crate::Coordinates;

/// Owns the task forwarding live positions to a callback.
///
/// Call [`WatchSubscription::stop`] to end delivery. Dropping the handle
/// stops it too, so the handle must be kept alive for as long as updates are
/// wanted.
#[derive(Debug)]
#[must_use = "dropping the subscription stops position updates"]
pub struct WatchSubscription {
    task: JoinHandle<()>,
}

impl WatchSubscription {
    /// Forward every item of `positions` to `callback` on a Tokio task.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn<F>(mut positions: BoxStream<'static, Coordinates>, mut callback: F) -> Self
    where
        F: FnMut(Coordinates) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(position) = positions.next().await {
                callback(position);
            }
        });
        Self { task }
    }

    /// Whether updates may still be delivered.
    ///
    /// Turns `false` once the platform ends the feed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop delivering updates.
    pub fn stop(self) {
        // Drop aborts the task.
        drop(self);
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
