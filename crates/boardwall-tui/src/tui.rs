//! Raw-mode terminal session.
//!
//! [`Tui::enter`] switches to the alternate screen; dropping the session
//! (or a panic, once [`install_hooks`] ran) puts the terminal back.

use std::io::{self, Stdout};

use color_eyre::eyre::Result;
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// (cols, rows)
    pub fn size(&self) -> Result<(u16, u16)> {
        let area = self.terminal.size()?;
        Ok((area.width, area.height))
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        leave();
    }
}

/// Best effort; every step runs even if an earlier one failed.
fn leave() {
    let mut out = io::stdout();
    let _ = execute!(out, cursor::Show);
    let _ = execute!(out, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// color-eyre report and panic hooks that leave the alternate screen first.
/// Call before [`Tui::enter`].
pub fn install_hooks() -> Result<()> {
    let (panic, report) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    report.install()?;

    let panic = panic.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        leave();
        panic(info);
    }));
    Ok(())
}
