//! All possible UI actions. Actions are the sole mechanism for state mutation.

use boardwall_core::{
    BoardId, CpuUsage, DashboardState, GameResult, LayoutPlan, Pairing, Position, SystemInfo,
};

/// Backend reachability as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Waiting,
    Ready,
    Unavailable(String),
}

/// A board widget came to life.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardMount {
    pub board_id: BoardId,
    pub pairing: Option<Pairing>,
    pub position: Position,
}

/// Severity of a transient status-bar message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── User requests ────────────────────────────────────────
    ToggleHelp,
    RefreshBoards,
    /// The refresh started by [`Action::RefreshBoards`] has returned.
    RefreshDone,

    // ── Backend / dashboard state ────────────────────────────
    Backend(BackendStatus),
    DashboardState(DashboardState),
    LayoutChanged(LayoutPlan),
    SystemInfo(SystemInfo),
    CpuUpdated(CpuUsage),
    Notify(Notification),

    // ── Board widgets ────────────────────────────────────────
    BoardMounted(BoardMount),
    BoardPosition { board_id: BoardId, position: Position },
    BoardResult { board_id: BoardId, result: Option<GameResult> },
    BoardRemoved(BoardId),
}
