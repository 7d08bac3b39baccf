//! Board lifecycle and layout core for the boardwall dashboard.
//!
//! Rendering-agnostic: front ends plug in through two seams.
//!
//! - **[`Backend`]**: the game server, implemented for
//!   [`boardwall_api::BackendClient`].
//! - **[`WidgetFactory`] / [`BoardWidget`]**: whatever draws a board.
//!
//! [`Dashboard`] sequences startup and owns the [`Registry`], which keeps
//! exactly one poll timer, at most one game-end watchdog and at most one
//! widget per board id. Layout comes from the pure [`layout::plan`].

pub mod assets;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod layout;
pub mod model;
pub mod registry;
pub mod timer;
pub mod widget;

mod poller;
mod telemetry;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardState};
pub use debounce::Debouncer;
pub use error::CoreError;
pub use layout::{LayoutPlan, Viewport};
pub use model::{Board, BoardId, CpuUsage, GameResult, Pairing, Position, Profile, SystemInfo};
pub use registry::{PollSettings, Registry};
pub use widget::{BoardWidget, WidgetFactory};
