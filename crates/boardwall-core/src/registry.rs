// ── Board render/state registry ──
//
// Owns, per board id, the widget, the poll timer and the optional game-end
// watchdog. Every widget is created, rendered, resized and destroyed from
// inside this module. Timer tasks hold a cloned handle and the generation
// they were spawned for; once their entry is replaced they stop touching it.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::DashboardConfig;
use crate::layout::LayoutPlan;
use crate::model::{Board, BoardId};
use crate::poller;
use crate::timer::TimerHandle;
use crate::widget::{BoardWidget, WidgetFactory};

/// Timing the per-board tasks run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub poll_interval: Duration,
    pub watchdog_grace: Duration,
}

impl From<&DashboardConfig> for PollSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            watchdog_grace: config.watchdog_grace,
        }
    }
}

/// Delayed restart armed after a finished game was observed.
struct Watchdog {
    timer: TimerHandle,
    /// Set once the grace period elapsed and the restart flow is running.
    firing: bool,
}

struct BoardRuntimeEntry {
    board_id: BoardId,
    generation: u64,
    widget: Option<Box<dyn BoardWidget>>,
    poll: TimerHandle,
    watchdog: Option<Watchdog>,
}

impl BoardRuntimeEntry {
    /// Cancel both timers and destroy the widget. Safe to call twice.
    fn teardown(&mut self) {
        self.poll.cancel();
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.timer.cancel();
        }
        if let Some(mut widget) = self.widget.take() {
            widget.destroy();
        }
        debug!(board_id = %self.board_id, generation = self.generation, "board entry torn down");
    }
}

struct RegistryState {
    entries: IndexMap<BoardId, BoardRuntimeEntry>,
    plan: LayoutPlan,
    next_generation: u64,
}

struct RegistryInner<B> {
    backend: Arc<B>,
    factory: Arc<dyn WidgetFactory>,
    settings: PollSettings,
    state: Mutex<RegistryState>,
}

/// Cheaply cloneable handle to the board registry.
pub struct Registry<B: Backend> {
    inner: Arc<RegistryInner<B>>,
}

impl<B: Backend> Clone for Registry<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> Registry<B> {
    pub fn new(backend: Arc<B>, factory: Arc<dyn WidgetFactory>, settings: PollSettings) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                backend,
                factory,
                settings,
                state: Mutex::new(RegistryState {
                    entries: IndexMap::new(),
                    plan: LayoutPlan::default(),
                    next_generation: 0,
                }),
            }),
        }
    }

    pub(crate) fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub(crate) fn settings(&self) -> PollSettings {
        self.inner.settings
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Install `board`, replacing any existing entry for its id.
    ///
    /// The old entry is torn down first, so at most one poll timer and one
    /// widget ever exist per id.
    pub async fn upsert_board(&self, board: Board) {
        let mut state = self.inner.state.lock().await;
        self.install(&mut state, board);
    }

    /// Tear down every entry. Idempotent.
    pub async fn destroy_all(&self) {
        let mut state = self.inner.state.lock().await;
        let count = state.entries.len();
        for (_, mut entry) in state.entries.drain(..) {
            entry.teardown();
        }
        if count > 0 {
            info!(count, "all boards destroyed");
        }
    }

    /// Tear down one entry. Returns whether it existed.
    pub async fn destroy_one(&self, board_id: BoardId) -> bool {
        let mut state = self.inner.state.lock().await;
        match state.entries.shift_remove(&board_id) {
            Some(mut entry) => {
                entry.teardown();
                true
            }
            None => false,
        }
    }

    /// Store `plan` and resize every live widget to it.
    pub async fn apply_layout(&self, plan: LayoutPlan) {
        let mut state = self.inner.state.lock().await;
        state.plan = plan;
        for entry in state.entries.values_mut() {
            if let Some(widget) = entry.widget.as_mut() {
                widget.resize(&plan);
            }
        }
        debug!(cols = plan.cols, rows = plan.rows, "layout applied");
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Ids in insertion order.
    pub async fn board_ids(&self) -> Vec<BoardId> {
        self.inner.state.lock().await.entries.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.state.lock().await.entries.is_empty()
    }

    pub async fn live_poll_timers(&self) -> usize {
        let state = self.inner.state.lock().await;
        state.entries.values().filter(|e| e.poll.is_active()).count()
    }

    pub async fn live_widgets(&self) -> usize {
        let state = self.inner.state.lock().await;
        state.entries.values().filter(|e| e.widget.is_some()).count()
    }

    pub async fn is_watchdog_armed(&self, board_id: BoardId) -> bool {
        let state = self.inner.state.lock().await;
        state
            .entries
            .get(&board_id)
            .is_some_and(|e| e.watchdog.is_some())
    }

    pub async fn current_plan(&self) -> LayoutPlan {
        self.inner.state.lock().await.plan
    }

    // ── Poller and watchdog hooks ────────────────────────────────────

    /// Apply one poll result for the entry spawned as `generation`.
    ///
    /// Renders the position, then runs the watchdog transitions: a finished
    /// game arms the watchdog, a running one cancels a watchdog that has not
    /// fired yet.
    pub(crate) async fn observe(&self, generation: u64, board: Board) {
        let mut state = self.inner.state.lock().await;
        let Some(entry) = state.entries.get_mut(&board.id) else {
            return;
        };
        if entry.generation != generation {
            return;
        }

        if let Some(widget) = entry.widget.as_mut() {
            widget.render(&board.position);
            widget.show_result(board.result());
        }

        let terminal = board.is_terminal();
        match entry.watchdog.as_ref().map(|w| w.firing) {
            None if terminal => {
                info!(board_id = %board.id, result = ?board.result(), "game finished, restart scheduled");
                entry.watchdog = Some(Watchdog {
                    timer: self.spawn_watchdog(board.id, generation),
                    firing: false,
                });
            }
            Some(false) if !terminal => {
                debug!(board_id = %board.id, "game resumed, restart cancelled");
                if let Some(watchdog) = entry.watchdog.take() {
                    watchdog.timer.cancel();
                }
            }
            _ => {}
        }
    }

    /// Mark the watchdog owning `cancel` as firing. Returns false when it
    /// was cancelled or its entry replaced while the grace period ran out.
    pub(crate) async fn begin_restart(
        &self,
        board_id: BoardId,
        generation: u64,
        cancel: &CancellationToken,
    ) -> bool {
        let mut state = self.inner.state.lock().await;
        if cancel.is_cancelled() {
            return false;
        }
        match state.entries.get_mut(&board_id) {
            Some(entry) if entry.generation == generation => match entry.watchdog.as_mut() {
                Some(watchdog) => {
                    watchdog.firing = true;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Finish a restart by installing the fresh board, unless the entry was
    /// destroyed or replaced while the restart was in flight.
    pub(crate) async fn complete_restart(&self, generation: u64, board: Board) -> bool {
        let mut state = self.inner.state.lock().await;
        let current = state
            .entries
            .get(&board.id)
            .is_some_and(|e| e.generation == generation);
        if current {
            self.install(&mut state, board);
        }
        current
    }

    /// Drop the watchdog after a failed restart so a later finished game
    /// can arm a new one.
    pub(crate) async fn abort_restart(&self, board_id: BoardId, generation: u64) {
        let mut state = self.inner.state.lock().await;
        if let Some(entry) = state.entries.get_mut(&board_id) {
            if entry.generation == generation {
                entry.watchdog = None;
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn install(&self, state: &mut RegistryState, board: Board) {
        let board_id = board.id;
        if let Some(old) = state.entries.get_mut(&board_id) {
            old.teardown();
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        let plan = state.plan;

        let widget = match self.inner.factory.create(&board, &plan) {
            Ok(mut widget) => {
                widget.render(&board.position);
                widget.show_result(board.result());
                widget.resize(&plan);
                Some(widget)
            }
            Err(e) => {
                warn!(board_id = %board_id, error = %e, "widget construction failed, board keeps polling");
                None
            }
        };

        let poll = self.spawn_poll(board_id, generation);
        // `insert` on an existing key keeps its position in the grid.
        state.entries.insert(
            board_id,
            BoardRuntimeEntry {
                board_id,
                generation,
                widget,
                poll,
                watchdog: None,
            },
        );
        debug!(board_id = %board_id, generation, "board installed");
    }

    fn spawn_poll(&self, board_id: BoardId, generation: u64) -> TimerHandle {
        let registry = self.clone();
        TimerHandle::spawn(move |cancel| poller::poll_board(registry, board_id, generation, cancel))
    }

    fn spawn_watchdog(&self, board_id: BoardId, generation: u64) -> TimerHandle {
        let registry = self.clone();
        TimerHandle::spawn(move |cancel| poller::watchdog(registry, board_id, generation, cancel))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{running, FakeBackend, FakeFactory};

    fn registry(backend: &Arc<FakeBackend>, factory: &Arc<FakeFactory>) -> Registry<FakeBackend> {
        Registry::new(
            Arc::clone(backend),
            Arc::clone(factory) as Arc<dyn WidgetFactory>,
            PollSettings {
                poll_interval: Duration::from_millis(250),
                watchdog_grace: Duration::from_millis(5000),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn upsert_twice_keeps_one_timer_and_one_widget() {
        let backend = Arc::new(FakeBackend::default());
        let factory = Arc::new(FakeFactory::default());
        let registry = registry(&backend, &factory);

        registry.upsert_board(running(1)).await;
        registry.upsert_board(running(1)).await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.live_poll_timers().await, 1);
        assert_eq!(registry.live_widgets().await, 1);
        assert_eq!(factory.created(), 2);
        assert_eq!(factory.destroyed(), 1);

        // Ticks at 250, 500, ..., 2500: one cadence, not two.
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert_eq!(backend.get_board_calls(BoardId(1)), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_all_is_idempotent() {
        let backend = Arc::new(FakeBackend::default());
        let factory = Arc::new(FakeFactory::default());
        let registry = registry(&backend, &factory);

        for id in 1..=3 {
            registry.upsert_board(running(id)).await;
        }
        assert_eq!(registry.live_poll_timers().await, 3);

        registry.destroy_all().await;
        registry.destroy_all().await;

        assert!(registry.is_empty().await);
        assert_eq!(registry.live_poll_timers().await, 0);
        assert_eq!(registry.live_widgets().await, 0);
        assert_eq!(factory.created(), 3);
        assert_eq!(factory.destroyed(), 3);

        let calls = backend.total_get_board_calls();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(backend.total_get_board_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_one_reports_presence() {
        let backend = Arc::new(FakeBackend::default());
        let factory = Arc::new(FakeFactory::default());
        let registry = registry(&backend, &factory);

        registry.upsert_board(running(4)).await;
        registry.upsert_board(running(5)).await;

        assert!(registry.destroy_one(BoardId(4)).await);
        assert!(!registry.destroy_one(BoardId(4)).await);
        assert_eq!(registry.board_ids().await, vec![BoardId(5)]);
        assert_eq!(factory.destroyed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn widget_failure_is_confined_to_its_board() {
        let backend = Arc::new(FakeBackend::default());
        let factory = Arc::new(FakeFactory::default());
        factory.fail_for(BoardId(2));
        let registry = registry(&backend, &factory);

        registry.upsert_board(running(1)).await;
        registry.upsert_board(running(2)).await;

        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.live_widgets().await, 1);
        assert_eq!(registry.live_poll_timers().await, 2);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(backend.get_board_calls(BoardId(2)) > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_layout_resizes_live_widgets() {
        let backend = Arc::new(FakeBackend::default());
        let factory = Arc::new(FakeFactory::default());
        let registry = registry(&backend, &factory);

        registry.upsert_board(running(1)).await;
        registry.upsert_board(running(2)).await;
        let before = factory.resized();

        let plan = LayoutPlan {
            cols: 2,
            rows: 1,
            board_size: 300.0,
        };
        registry.apply_layout(plan).await;

        assert_eq!(factory.resized(), before + 2);
        assert_eq!(registry.current_plan().await, plan);
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_entry_keeps_grid_position() {
        let backend = Arc::new(FakeBackend::default());
        let factory = Arc::new(FakeFactory::default());
        let registry = registry(&backend, &factory);

        for id in [3, 1, 2] {
            registry.upsert_board(running(id)).await;
        }
        registry.upsert_board(running(1)).await;

        assert_eq!(
            registry.board_ids().await,
            vec![BoardId(3), BoardId(1), BoardId(2)]
        );
    }
}
