// ── Board poller and game-end watchdog ──
//
// One poll task per board fetches its snapshot on a fixed cadence and hands
// it to the registry. A finished game arms a one-shot watchdog; if the game
// is still over when the grace period runs out, the watchdog requests a new
// game and reinstalls the board.
//
//   ACTIVE ── finished ──▶ PENDING_RESTART ── grace elapsed ──▶ restart
//     ▲                         │
//     └──────── running ────────┘

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::BoardId;
use crate::registry::Registry;

/// Periodically fetch `board_id` until `cancel` fires.
///
/// Fetch failures are logged and the next tick retries. A cancelled task
/// abandons an in-flight fetch.
pub(crate) async fn poll_board<B: Backend>(
    registry: Registry<B>,
    board_id: BoardId,
    generation: u64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(registry.settings().poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let snapshot = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            snapshot = registry.backend().get_board(board_id) => snapshot,
        };

        match snapshot {
            Ok(board) => registry.observe(generation, board).await,
            Err(e) => debug!(board_id = %board_id, error = %e, "poll skipped"),
        }
    }

    debug!(board_id = %board_id, generation, "poller stopped");
}

/// Wait out the grace period, then restart the game on `board_id`.
///
/// Cancellation only interrupts the wait. Once the restart flow has begun
/// it runs to completion even if the token fires.
pub(crate) async fn watchdog<B: Backend>(
    registry: Registry<B>,
    board_id: BoardId,
    generation: u64,
    cancel: CancellationToken,
) {
    tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        () = tokio::time::sleep(registry.settings().watchdog_grace) => {}
    }

    if !registry.begin_restart(board_id, generation, &cancel).await {
        return;
    }

    info!(board_id = %board_id, "restarting finished game");
    match restart(&registry, board_id, generation).await {
        Ok(true) => info!(board_id = %board_id, "board restarted"),
        Ok(false) => debug!(board_id = %board_id, "board replaced during restart, result dropped"),
        Err(e) => {
            warn!(board_id = %board_id, error = %e, "restart failed, board left as is");
            registry.abort_restart(board_id, generation).await;
        }
    }
}

async fn restart<B: Backend>(
    registry: &Registry<B>,
    board_id: BoardId,
    generation: u64,
) -> Result<bool, CoreError> {
    registry.backend().start_game(board_id).await?;
    let board = registry.backend().get_board(board_id).await?;
    Ok(registry.complete_restart(generation, board).await)
}
