//! Per-core CPU bars for the header panel.

use std::time::Duration;

use boardwall_core::CpuUsage;
use chrono::{DateTime, Utc};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme;

/// A sample older than this is flagged in the header.
pub const STALE_AFTER: Duration = Duration::from_secs(3);

/// Percentage bar as (filled, empty) strings, e.g. `("████", "░░░░")`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn fmt_pct_bar(pct: f64, width: u16) -> (String, String) {
    let clamped = if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 };
    let filled_count = ((clamped / 100.0) * f64::from(width)).round() as u16;
    let empty_count = width.saturating_sub(filled_count);
    (
        "█".repeat(usize::from(filled_count)),
        "░".repeat(usize::from(empty_count)),
    )
}

/// One compact bar per core, wrapped to lines of at most `max_width` cells.
/// The summary line carries the sample age once it passes [`STALE_AFTER`].
pub fn cpu_lines(
    usage: Option<&CpuUsage>,
    now: DateTime<Utc>,
    max_width: u16,
) -> Vec<Line<'static>> {
    const BAR: u16 = 6;
    const CELL: u16 = BAR + 6;

    let Some(usage) = usage else {
        return vec![Line::from(Span::styled("cpu  waiting for data", theme::key_hint()))];
    };

    let per_line = usize::from((max_width / CELL).max(1));
    let mut summary = vec![
        Span::styled("cpu ", theme::key_hint()),
        Span::styled(
            format!("avg {:>3.0}%", usage.average()),
            Style::default().fg(theme::load_color(usage.average())),
        ),
    ];
    let age = usage.age(now);
    if age >= STALE_AFTER {
        summary.push(Span::styled(
            format!("  stale {}s", age.as_secs()),
            Style::default().fg(theme::ERROR_RED),
        ));
    }
    let mut lines = vec![Line::from(summary)];

    for chunk in usage.per_core.chunks(per_line) {
        let mut spans = Vec::with_capacity(chunk.len() * 3);
        for pct in chunk {
            let (filled, empty) = fmt_pct_bar(*pct, BAR);
            spans.push(Span::styled(filled, Style::default().fg(theme::load_color(*pct))));
            spans.push(Span::styled(empty, theme::key_hint()));
            spans.push(Span::styled(format!("{pct:>4.0}% "), theme::key_hint()));
        }
        lines.push(Line::from(spans));
    }
    lines
}
