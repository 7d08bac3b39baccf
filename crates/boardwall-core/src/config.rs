// ── Runtime dashboard configuration ──
//
// Describes how often the dashboard talks to the backend and how it lays
// boards out. Core never reads config files or builds HTTP clients: the
// binary builds a `DashboardConfig` (usually through boardwall-config) and
// hands it in together with a connected backend.

use std::time::Duration;

use crate::layout::DEFAULT_PADDING;
use crate::model::SystemInfo;

/// Configuration for one dashboard instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Delay between two snapshot fetches of the same board.
    pub poll_interval: Duration,
    /// How long a finished game stays on screen before it is restarted.
    pub watchdog_grace: Duration,
    /// Quiet window before a burst of resizes is acted on.
    pub resize_debounce: Duration,
    /// Delay between two CPU samples.
    pub telemetry_interval: Duration,
    /// Padding subtracted from both viewport axes by the layout planner.
    pub layout_padding: f64,
    /// Used when `/get_system_info` cannot be fetched.
    pub fallback_system_info: SystemInfo,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            watchdog_grace: Duration::from_millis(5000),
            resize_debounce: Duration::from_millis(250),
            telemetry_interval: Duration::from_millis(1000),
            layout_padding: DEFAULT_PADDING,
            fallback_system_info: SystemInfo::default(),
        }
    }
}
