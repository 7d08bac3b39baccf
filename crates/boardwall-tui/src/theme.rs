//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Board Squares ─────────────────────────────────────────────────────

pub const LIGHT_SQUARE: Color = Color::Rgb(181, 166, 206); // #b5a6ce
pub const DARK_SQUARE: Color = Color::Rgb(86, 72, 122); // #56487a
pub const WHITE_PIECE: Color = Color::Rgb(255, 255, 255);
pub const BLACK_PIECE: Color = Color::Rgb(20, 20, 28); // #14141c

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Board border once the game has a result.
pub fn border_finished() -> Style {
    Style::default().fg(ELECTRIC_YELLOW)
}

pub fn player_name() -> Style {
    Style::default().fg(DIM_WHITE).add_modifier(Modifier::BOLD)
}

pub fn player_elo() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// "1-0" style banner under a finished board.
pub fn result_banner() -> Style {
    Style::default()
        .fg(BG_DARK)
        .bg(ELECTRIC_YELLOW)
        .add_modifier(Modifier::BOLD)
}

pub fn square(light: bool) -> Style {
    Style::default().bg(if light { LIGHT_SQUARE } else { DARK_SQUARE })
}

pub fn piece(white: bool) -> Color {
    if white { WHITE_PIECE } else { BLACK_PIECE }
}

/// Color for a utilization percentage.
pub fn load_color(pct: f64) -> Color {
    if pct >= 90.0 {
        ERROR_RED
    } else if pct >= 70.0 {
        CORAL
    } else if pct >= 40.0 {
        ELECTRIC_YELLOW
    } else {
        SUCCESS_GREEN
    }
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}
