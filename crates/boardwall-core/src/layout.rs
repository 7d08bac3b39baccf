// ── Viewport layout planner ──
//
// Picks the grid (columns x rows) that best fits a board count into a
// viewport. Pure and deterministic: the same inputs always produce the
// same plan, so it is recomputed from scratch on every resize.

use serde::{Deserialize, Serialize};

/// Grids taller than this are rejected outright.
pub const MAX_ROWS: u32 = 10;

/// Default padding subtracted from both viewport axes.
pub const DEFAULT_PADDING: f64 = 20.0;

const ASPECT_WEIGHT: f64 = 0.1;
const UTILIZATION_WEIGHT: f64 = 2.0;
const SQUARE_BONUS: f64 = 0.5;
const SQUARE_TOLERANCE: u32 = 2;

/// Dimensions the grid has to fit into. Units are whatever the renderer
/// uses (pixels, or half-rows in a terminal) as long as both axes agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Height taken by chrome above and below the grid.
    pub reserved_height: f64,
    /// Padding subtracted from each axis.
    pub padding: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            reserved_height: 0.0,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_reserved_height(mut self, reserved_height: f64) -> Self {
        self.reserved_height = reserved_height;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    fn available_width(&self) -> f64 {
        (self.width - self.padding).max(1.0)
    }

    fn available_height(&self) -> f64 {
        (self.height - self.reserved_height - self.padding).max(1.0)
    }
}

/// The chosen grid and the edge length of one board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub cols: u32,
    pub rows: u32,
    pub board_size: f64,
}

impl LayoutPlan {
    /// Number of grid cells, at least the board count it was planned for.
    pub fn cells(&self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }
}

impl Default for LayoutPlan {
    fn default() -> Self {
        Self {
            cols: 1,
            rows: 1,
            board_size: 0.0,
        }
    }
}

struct Candidate {
    plan: LayoutPlan,
    score: f64,
}

/// Compute the best grid for `num_boards` boards.
///
/// Every column count that keeps the grid within [`MAX_ROWS`] is scored on
/// wasted cells, deviation from the viewport aspect ratio, and how much of
/// the viewport the boards actually cover. Near-square grids get a bonus. A board
/// count of zero plans for a single board.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::as_conversions
)]
pub fn plan(num_boards: usize, viewport: Viewport) -> LayoutPlan {
    let n = u32::try_from(num_boards.max(1)).unwrap_or(u32::MAX);
    let available_w = viewport.available_width();
    let available_h = viewport.available_height();
    let viewport_aspect = available_w / available_h;

    let mut best: Option<Candidate> = None;

    for cols in n.div_ceil(MAX_ROWS)..=n {
        let rows = n.div_ceil(cols);
        if rows > MAX_ROWS {
            continue;
        }

        let board_size = (available_w / f64::from(cols)).min(available_h / f64::from(rows));
        let wasted = (u64::from(cols) * u64::from(rows) - u64::from(n)) as f64;
        let aspect_penalty =
            ASPECT_WEIGHT * (f64::from(cols) / f64::from(rows) - viewport_aspect).abs();
        let utilization = (f64::from(cols) * board_size / available_w)
            .min(f64::from(rows) * board_size / available_h);

        let mut score = wasted + aspect_penalty + (1.0 - utilization) * UTILIZATION_WEIGHT;
        if cols.abs_diff(rows) <= SQUARE_TOLERANCE {
            score -= SQUARE_BONUS;
        }

        if best.as_ref().is_none_or(|b| score < b.score) {
            best = Some(Candidate {
                plan: LayoutPlan {
                    cols,
                    rows,
                    board_size,
                },
                score,
            });
        }
    }

    // A single row always survives the row cap, so this only guards an
    // empty loop.
    best.map_or_else(
        || LayoutPlan {
            cols: n,
            rows: 1,
            board_size: (available_w / f64::from(n)).min(available_h),
        },
        |c| c.plan,
    )
}
