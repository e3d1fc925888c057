// Cancellation - Stop requests for a running distribution
// Tripped from outside the engine and checked before each recipient

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, warn};

/// Shared stop request, honoured between recipients.
///
/// A submission already in flight always runs to a definite outcome first.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop before the next recipient
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Escalating interrupt handling.
///
/// `interrupted` resolves to `true` on each interrupt and `false` once no more can
/// arrive. The first interrupt trips `cancel`; the function returns `true` on the
/// second one, meaning the caller should exit without waiting for the run.
pub async fn escalate_interrupts<F, Fut>(cancel: &CancellationFlag, mut interrupted: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !interrupted().await {
        return false;
    }
    warn!("Interrupt received, finishing the current recipient (interrupt again to exit now)");
    cancel.cancel();

    if !interrupted().await {
        return false;
    }
    error!("Second interrupt, exiting without waiting for the in-flight transaction");
    true
}
