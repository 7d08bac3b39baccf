//! Board grid screen: one cell per mounted board, laid out `cols x rows`
//! from the dashboard's current layout plan.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use indexmap::IndexMap;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::Paragraph,
};

use boardwall_core::{BoardId, LayoutPlan};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::board_view::{BoardCell, BoardView};

#[derive(Default)]
pub struct BoardsScreen {
    boards: IndexMap<BoardId, BoardCell>,
    plan: LayoutPlan,
    selected: usize,
    /// Set while a refresh tears boards down; removals then drop the cell.
    refreshing: bool,
}

impl BoardsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn selected(&self) -> Option<&BoardCell> {
        self.boards.get_index(self.selected).map(|(_, cell)| cell)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.boards.len();
        if len == 0 {
            return;
        }
        let current = isize::try_from(self.selected).unwrap_or(0);
        let len = isize::try_from(len).unwrap_or(isize::MAX);
        self.selected = usize::try_from((current + delta).rem_euclid(len)).unwrap_or(0);
    }

    fn cols(&self) -> isize {
        isize::try_from(self.plan.cols.max(1)).unwrap_or(1)
    }

    /// Split `area` into the plan's grid, row-major.
    fn cells(&self, area: Rect) -> Vec<Rect> {
        let cols = self.plan.cols.max(1);
        let rows = self.plan.rows.max(1);
        let row_areas = Layout::vertical((0..rows).map(|_| Constraint::Fill(1))).split(area);
        row_areas
            .iter()
            .flat_map(|row| {
                Layout::horizontal((0..cols).map(|_| Constraint::Fill(1)))
                    .split(*row)
                    .to_vec()
            })
            .collect()
    }
}

impl Component for BoardsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.move_selection(1),
            KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(self.cols()),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-self.cols()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LayoutChanged(plan) => self.plan = *plan,
            Action::BoardMounted(mount) => {
                // Replacing a board keeps its slot in the grid.
                self.boards.insert(
                    mount.board_id,
                    BoardCell::new(mount.board_id, mount.pairing.clone(), mount.position.clone()),
                );
            }
            Action::BoardPosition { board_id, position } => {
                if let Some(cell) = self.boards.get_mut(board_id) {
                    cell.position = position.clone();
                }
            }
            Action::BoardResult { board_id, result } => {
                if let Some(cell) = self.boards.get_mut(board_id) {
                    cell.result = *result;
                }
            }
            Action::BoardRemoved(board_id) if self.refreshing => {
                self.boards.shift_remove(board_id);
            }
            Action::BoardRemoved(board_id) => {
                // The replacement of a restarted board mounts right after,
                // under the same id; keep the slot until then.
                if let Some(cell) = self.boards.get_mut(board_id) {
                    cell.result = None;
                }
            }
            Action::RefreshBoards => self.refreshing = true,
            Action::RefreshDone => self.refreshing = false,
            _ => {}
        }
        if self.selected >= self.boards.len() {
            self.selected = self.boards.len().saturating_sub(1);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.boards.is_empty() {
            frame.render_widget(
                Paragraph::new("  no boards yet").style(theme::key_hint()),
                area,
            );
            return;
        }

        for (index, ((_, cell), rect)) in self.boards.iter().zip(self.cells(area)).enumerate() {
            frame.render_widget(
                BoardView::new(cell).selected(index == self.selected),
                rect,
            );
        }
    }
}
