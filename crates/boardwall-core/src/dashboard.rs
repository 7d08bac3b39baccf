// ── Dashboard orchestrator ──
//
// Top-level sequencing: preload, seed the layout from system info, start
// the games, install every board, then keep the layout in step with the
// viewport and publish CPU telemetry. Consumers observe the layout, the
// telemetry and the lifecycle state through `watch` channels.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::assets;
use crate::backend::Backend;
use crate::config::DashboardConfig;
use crate::debounce::Debouncer;
use crate::error::CoreError;
use crate::layout::{self, LayoutPlan, Viewport};
use crate::model::{CpuUsage, SystemInfo};
use crate::registry::{PollSettings, Registry};
use crate::telemetry;
use crate::timer::TimerHandle;
use crate::widget::WidgetFactory;

// ── DashboardState ───────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DashboardState {
    Idle,
    Starting,
    Running,
    Refreshing,
    Stopped,
}

// ── Dashboard ────────────────────────────────────────────────────

/// Entry point for front ends.
///
/// Cheaply cloneable. Does nothing until [`start()`](Self::start) is called,
/// and [`shutdown()`](Self::shutdown) leaves no task behind.
pub struct Dashboard<B: Backend> {
    inner: Arc<DashboardInner<B>>,
}

impl<B: Backend> Clone for Dashboard<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct DashboardInner<B: Backend> {
    backend: Arc<B>,
    config: DashboardConfig,
    registry: Registry<B>,
    state: watch::Sender<DashboardState>,
    layout: watch::Sender<LayoutPlan>,
    system_info: watch::Sender<Option<SystemInfo>>,
    cpu: watch::Sender<Option<CpuUsage>>,
    viewport: Mutex<Viewport>,
    /// Board count the published layout was planned for.
    planned_boards: AtomicUsize,
    resize: Mutex<Option<Debouncer>>,
    telemetry: Mutex<Option<TimerHandle>>,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: Arc<B>, factory: Arc<dyn WidgetFactory>, config: DashboardConfig) -> Self {
        let registry = Registry::new(Arc::clone(&backend), factory, PollSettings::from(&config));
        let viewport = Viewport::new(0.0, 0.0).with_padding(config.layout_padding);

        Self {
            inner: Arc::new(DashboardInner {
                backend,
                config,
                registry,
                state: watch::channel(DashboardState::Idle).0,
                layout: watch::channel(LayoutPlan::default()).0,
                system_info: watch::channel(None).0,
                cpu: watch::channel(None).0,
                viewport: Mutex::new(viewport),
                planned_boards: AtomicUsize::new(1),
                resize: Mutex::new(None),
                telemetry: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Registry<B> {
        &self.inner.registry
    }

    // ── Subscriptions ────────────────────────────────────────────

    pub fn subscribe_state(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_layout(&self) -> watch::Receiver<LayoutPlan> {
        self.inner.layout.subscribe()
    }

    pub fn subscribe_system_info(&self) -> watch::Receiver<Option<SystemInfo>> {
        self.inner.system_info.subscribe()
    }

    pub fn subscribe_cpu(&self) -> watch::Receiver<Option<CpuUsage>> {
        self.inner.cpu.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        *self.inner.state.borrow()
    }

    pub fn layout(&self) -> LayoutPlan {
        *self.inner.layout.borrow()
    }

    /// Most recent viewport, padding applied.
    pub fn viewport(&self) -> Viewport {
        *self.inner.viewport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Bring the dashboard up inside `viewport`.
    ///
    /// Asset, system-info and board-list failures are logged and startup
    /// carries on in a degraded state; [`refresh_boards()`](Self::refresh_boards)
    /// retries the board list.
    pub async fn start(&self, viewport: Viewport) -> Result<(), CoreError> {
        if self.state() != DashboardState::Idle {
            return Err(CoreError::Internal(format!(
                "dashboard cannot start while {}",
                self.state()
            )));
        }
        self.inner.state.send_replace(DashboardState::Starting);
        self.store_viewport(viewport);
        // Resizes during the fetches below replan as soon as they settle.
        self.arm_resize();
        let backend = &self.inner.backend;

        match assets::preload(backend.as_ref()).await {
            Ok(report) => info!(
                loaded = report.loaded,
                failed = report.failed,
                "assets preloaded"
            ),
            Err(e) => warn!(error = %e, "asset manifest unavailable, continuing"),
        }

        let system_info = match backend.system_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "system info unavailable, using fallback");
                self.inner.config.fallback_system_info.clone()
            }
        };
        let seed = usize::try_from(system_info.num_boards).unwrap_or(1);
        self.inner.system_info.send_replace(Some(system_info));
        self.publish_layout(seed).await;

        // Listed boards only carry their pairing once the games exist.
        if let Err(e) = backend.start_games().await {
            warn!(error = %e, "start_games failed");
        }

        if let Err(e) = self.load_boards().await {
            warn!(error = %e, "board list unavailable, press refresh to retry");
        }

        self.start_telemetry();

        self.inner.state.send_replace(DashboardState::Running);
        let boards = self.inner.registry.len().await;
        info!(boards, "dashboard running");
        Ok(())
    }

    /// Record a new viewport. The layout follows once resizes go quiet for
    /// the configured debounce window.
    pub fn on_resize(&self, viewport: Viewport) {
        self.store_viewport(viewport);
        let resize = self.inner.resize.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(debouncer) = resize.as_ref() {
            debouncer.trigger();
        }
    }

    /// Tear down every board and install the backend's current list.
    pub async fn refresh_boards(&self) -> Result<usize, CoreError> {
        if self.state() != DashboardState::Running {
            return Err(CoreError::Internal(format!(
                "dashboard cannot refresh while {}",
                self.state()
            )));
        }
        self.inner.state.send_replace(DashboardState::Refreshing);
        self.inner.registry.destroy_all().await;
        let result = self.load_boards().await;
        self.inner.state.send_replace(DashboardState::Running);
        result
    }

    /// Cancel resize handling and telemetry and destroy every board.
    /// Idempotent.
    pub async fn shutdown(&self) {
        if let Some(debouncer) = self
            .inner
            .resize
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            debouncer.cancel();
        }
        if let Some(timer) = self
            .inner
            .telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.cancel();
        }
        self.inner.registry.destroy_all().await;

        if self.state() != DashboardState::Stopped {
            self.inner.state.send_replace(DashboardState::Stopped);
            info!("dashboard stopped");
        }
    }

    // ── Internals ────────────────────────────────────────────────

    /// Fetch the board list, install each board, then replan for the real
    /// count and the latest viewport.
    async fn load_boards(&self) -> Result<usize, CoreError> {
        let boards = self.inner.backend.get_boards().await?;
        let count = boards.len();
        for board in boards {
            self.inner.registry.upsert_board(board).await;
        }
        let seeded = self.inner.planned_boards.load(Ordering::Relaxed);
        if count != seeded {
            debug!(seeded, count, "board count differs from layout seed");
        }
        self.publish_layout(count).await;
        info!(count, "boards loaded");
        Ok(count)
    }

    async fn publish_layout(&self, num_boards: usize) {
        self.inner.planned_boards.store(num_boards, Ordering::Relaxed);
        let plan = layout::plan(num_boards, self.viewport());
        self.inner.layout.send_replace(plan);
        self.inner.registry.apply_layout(plan).await;
    }

    /// Replan for the current viewport. Boards still loading count as the
    /// number the last plan assumed.
    async fn relayout(&self) {
        let count = match self.inner.registry.len().await {
            0 => self.inner.planned_boards.load(Ordering::Relaxed),
            n => n,
        };
        self.publish_layout(count).await;
    }

    fn arm_resize(&self) {
        let weak: Weak<DashboardInner<B>> = Arc::downgrade(&self.inner);
        let debouncer = Debouncer::new(self.inner.config.resize_debounce, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    Dashboard { inner }.relayout().await;
                }
            }
        });
        *self.inner.resize.lock().unwrap_or_else(PoisonError::into_inner) = Some(debouncer);
    }

    fn start_telemetry(&self) {
        let backend = Arc::clone(&self.inner.backend);
        let period = self.inner.config.telemetry_interval;
        let tx = self.inner.cpu.clone();
        let timer = TimerHandle::spawn(move |cancel| {
            telemetry::telemetry_task(backend, period, tx, cancel)
        });
        *self.inner.telemetry.lock().unwrap_or_else(PoisonError::into_inner) = Some(timer);
    }

    fn store_viewport(&self, viewport: Viewport) {
        let viewport = viewport.with_padding(self.inner.config.layout_padding);
        *self.inner.viewport.lock().unwrap_or_else(PoisonError::into_inner) = viewport;
    }
}
