//! Screen-level building block.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// A piece of UI that reacts to keys and actions and draws itself.
///
/// Both handlers may answer with a follow-up [`Action`] that the app loop
/// dispatches next.
pub trait Component: Send {
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);
}
