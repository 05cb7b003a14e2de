//! Supervised fire-and-forget background tasks.
//!
//! The stale-while-revalidate refresh must never delay or fail the response
//! already served, but its failures should not vanish either. Tasks spawned
//! here run detached on the tokio runtime, log their failures with a label,
//! and are counted so that tests and shutdown can wait for quiescence.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use waylay_core::Error;

/// Tracks detached background tasks.
///
/// Cheap to clone; clones share the same in-flight counter.
#[derive(Clone, Default)]
pub struct Supervisor {
    inflight: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a background task. The caller never awaits it; a failure is
    /// logged under `label` and otherwise dropped.
    pub fn spawn<F>(&self, label: &'static str, fut: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.inflight.fetch_add(1, Ordering::AcqRel);
        let inflight = Arc::clone(&self.inflight);
        let notify = Arc::clone(&self.notify);

        tokio::spawn(async move {
            if let Err(e) = fut.await {
                tracing::warn!(task = label, error = %e, "background task failed");
            }
            inflight.fetch_sub(1, Ordering::AcqRel);
            notify.notify_waiters();
        });
    }

    /// Number of tasks currently in flight.
    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    /// Wait until no spawned task is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.notify.notified();
            if self.inflight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}
