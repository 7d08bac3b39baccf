//! Data bridge: connects the [`Dashboard`] to TUI actions.
//!
//! Runs as a background task. Waits for the backend to answer health checks,
//! starts the dashboard, then forwards every state, layout, system-info and
//! CPU change as an [`Action`] until cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use boardwall_api::BackendClient;
use boardwall_core::Dashboard;

use crate::action::{Action, BackendStatus, Notification, NotificationLevel};

/// How many health checks to attempt and how long to wait between them.
#[derive(Debug, Clone, Copy)]
pub struct HealthCheck {
    pub attempts: u32,
    pub backoff: Duration,
}

pub async fn spawn_data_bridge(
    client: Arc<BackendClient>,
    dashboard: Dashboard<BackendClient>,
    health: HealthCheck,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::Backend(BackendStatus::Waiting));

    let ready = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        r = client.wait_until_ready(health.attempts, health.backoff) => r,
    };
    if let Err(e) = ready {
        warn!(error = %e, "backend never became ready");
        let _ = action_tx.send(Action::Backend(BackendStatus::Unavailable(e.to_string())));
        return;
    }
    let _ = action_tx.send(Action::Backend(BackendStatus::Ready));

    let mut state = dashboard.subscribe_state();
    let mut layout = dashboard.subscribe_layout();
    let mut system_info = dashboard.subscribe_system_info();
    let mut cpu = dashboard.subscribe_cpu();

    // Resizes seen while waiting were stored by on_resize.
    if let Err(e) = dashboard.start(dashboard.viewport()).await {
        warn!(error = %e, "dashboard failed to start");
        let _ = action_tx.send(Action::Notify(Notification {
            message: format!("start failed: {e}"),
            level: NotificationLevel::Warning,
        }));
    }

    // Snapshots first, so the screen catches up with whatever start() did.
    let _ = action_tx.send(Action::DashboardState(*state.borrow_and_update()));
    let _ = action_tx.send(Action::LayoutChanged(*layout.borrow_and_update()));
    if let Some(info) = system_info.borrow_and_update().clone() {
        let _ = action_tx.send(Action::SystemInfo(info));
    }
    if let Some(sample) = cpu.borrow_and_update().clone() {
        let _ = action_tx.send(Action::CpuUpdated(sample));
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = state.changed() => {
                let s = *state.borrow_and_update();
                debug!(state = %s, "dispatching DashboardState");
                let _ = action_tx.send(Action::DashboardState(s));
            }
            Ok(()) = layout.changed() => {
                let plan = *layout.borrow_and_update();
                debug!(cols = plan.cols, rows = plan.rows, "dispatching LayoutChanged");
                let _ = action_tx.send(Action::LayoutChanged(plan));
            }
            Ok(()) = system_info.changed() => {
                if let Some(info) = system_info.borrow_and_update().clone() {
                    let _ = action_tx.send(Action::SystemInfo(info));
                }
            }
            Ok(()) = cpu.changed() => {
                if let Some(sample) = cpu.borrow_and_update().clone() {
                    let _ = action_tx.send(Action::CpuUpdated(sample));
                }
            }
            else => break,
        }
    }

    dashboard.shutdown().await;
    debug!("data bridge shut down");
}
