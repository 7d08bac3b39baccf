// ── CPU telemetry poller ──
//
// Samples `/cpu` on a fixed interval and publishes the latest reading.
// Independent of board state: a failed sample leaves the previous one in
// place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::Backend;
use crate::model::CpuUsage;

pub(crate) async fn telemetry_task<B: Backend>(
    backend: Arc<B>,
    period: Duration,
    tx: watch::Sender<Option<CpuUsage>>,
    cancel: CancellationToken,
) {
    // The first tick completes immediately so the panel fills on startup.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let sample = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            sample = backend.cpu_usage() => sample,
        };

        match sample {
            Ok(per_core) => {
                tx.send_replace(Some(CpuUsage::new(per_core)));
            }
            Err(e) => debug!(error = %e, "cpu sample failed"),
        }
    }
}
