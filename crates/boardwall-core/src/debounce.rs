// ── Trailing-edge debounce ──
//
// Wraps a zero-argument async action so a burst of triggers collapses into
// one call, made `delay` after the last trigger of the burst.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::trace;

use crate::timer::TimerHandle;

type Action = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Collapses repeated triggers into a single trailing call.
pub struct Debouncer {
    delay: Duration,
    action: Action,
    pending: Mutex<Option<TimerHandle>>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            action: Arc::new(move || action().boxed()),
            pending: Mutex::new(None),
        }
    }

    /// Restart the quiet window. The action runs once the window elapses
    /// without another trigger.
    pub fn trigger(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.cancel();
        }

        let delay = self.delay;
        let action = Arc::clone(&self.action);
        *pending = Some(TimerHandle::spawn(move |cancel| async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => trace!("debounced call superseded"),
                () = tokio::time::sleep(delay) => action().await,
            }
        }));
    }

    /// Drop any pending call. Idempotent.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
    }

    /// Whether a call is waiting for its quiet window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(TimerHandle::is_active)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
