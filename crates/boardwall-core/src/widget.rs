// ── Rendering capability ──
//
// The registry drives widgets through these two traits and never learns
// what draws the board. A terminal renderer, a test double or anything else
// can sit behind them.

use crate::error::CoreError;
use crate::layout::LayoutPlan;
use crate::model::{Board, GameResult, Position};

/// One live board display.
pub trait BoardWidget: Send {
    /// Show `position`. Called once after creation and again on every poll.
    fn render(&mut self, position: &Position);

    /// Follow the game outcome, `None` while it is still being played.
    /// Called right after every `render`.
    fn show_result(&mut self, _result: Option<GameResult>) {}

    /// Follow a new layout plan.
    fn resize(&mut self, _plan: &LayoutPlan) {}

    /// Release whatever the widget holds. Called exactly once, before the
    /// widget is dropped.
    fn destroy(&mut self);
}

/// Builds widgets for boards entering the registry.
pub trait WidgetFactory: Send + Sync {
    /// Construct a widget for `board`. A failure is confined to that board.
    fn create(&self, board: &Board, plan: &LayoutPlan) -> Result<Box<dyn BoardWidget>, CoreError>;
}
