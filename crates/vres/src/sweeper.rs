//! Background expiry sweeping.
//!
//! A sweeper is a tokio task that calls [`Registry::sweep_expired`] on the
//! configured interval. It holds only a weak reference, so dropping the last
//! `Arc<Registry>` ends it too.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use vres_store::Store;

use crate::registry::Registry;

/// Handle to a running sweeper task.
///
/// Dropping the handle signals the task to stop; [`SweeperHandle::shutdown`]
/// also waits for it to finish.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for the task to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "sweeper task ended abnormally");
            }
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl<S: Store + 'static> Registry<S> {
    /// Spawn a background sweeper on the current tokio runtime.
    ///
    /// Runs every `sweep_interval` from the configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let interval = self.config().sweep_interval;
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(run(Arc::downgrade(self), interval, rx));

        SweeperHandle {
            shutdown: Some(tx),
            task: Some(task),
        }
    }
}

async fn run<S: Store + 'static>(
    registry: Weak<Registry<S>>,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    tracing::debug!(period_ms = period.as_millis() as u64, "sweeper started");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                if let Err(e) = registry.sweep_expired() {
                    tracing::warn!(error = %e, "sweep failed");
                }
            }
        }
    }
    tracing::debug!("sweeper stopped");
}
