// ── Cancelable timer handles ──
//
// Every periodic or delayed task the registry starts is represented by a
// `TimerHandle`. Cancellation is explicit: dropping a handle does not stop
// the task, so owners must call `cancel()` before discarding it.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a spawned timer task.
#[derive(Debug)]
pub struct TimerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Spawn `make(token)` on the runtime. The future must observe the
    /// token and return promptly once it is cancelled.
    pub fn spawn<F, Fut>(make: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(make(cancel.clone()));
        Self { cancel, task }
    }

    /// Signal the task to stop. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Live means neither cancelled nor run to completion.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_task() {
        let timer = TimerHandle::spawn(|cancel| async move {
            cancel.cancelled().await;
        });
        assert!(timer.is_active());

        timer.cancel();
        timer.cancel();
        assert!(timer.is_cancelled());
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_task_is_not_active() {
        let timer = TimerHandle::spawn(|_cancel| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!timer.is_cancelled());
        assert!(!timer.is_active());
    }
}
