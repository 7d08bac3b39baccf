pub mod board_view;
pub mod cpu_bars;
