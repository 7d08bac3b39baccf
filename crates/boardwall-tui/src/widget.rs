//! Terminal implementation of the core's widget capability.
//!
//! Widgets never draw directly: they forward state changes to the app loop
//! as actions, and the boards screen draws on the next render tick.

use tokio::sync::mpsc::UnboundedSender;

use boardwall_core::{
    Board, BoardId, BoardWidget, CoreError, GameResult, LayoutPlan, Position, WidgetFactory,
};

use crate::action::{Action, BoardMount};

pub struct TuiWidgetFactory {
    action_tx: UnboundedSender<Action>,
}

impl TuiWidgetFactory {
    pub fn new(action_tx: UnboundedSender<Action>) -> Self {
        Self { action_tx }
    }
}

impl WidgetFactory for TuiWidgetFactory {
    fn create(&self, board: &Board, _plan: &LayoutPlan) -> Result<Box<dyn BoardWidget>, CoreError> {
        let mount = BoardMount {
            board_id: board.id,
            pairing: board.pairing().cloned(),
            position: board.position.clone(),
        };
        self.action_tx
            .send(Action::BoardMounted(mount))
            .map_err(|_| CoreError::Widget {
                board_id: board.id,
                message: "terminal UI has shut down".into(),
            })?;

        Ok(Box::new(TuiBoardWidget {
            board_id: board.id,
            action_tx: self.action_tx.clone(),
            position: board.position.clone(),
            result: None,
        }))
    }
}

/// Forwards only what changed, so a quiet board costs nothing per poll.
struct TuiBoardWidget {
    board_id: BoardId,
    action_tx: UnboundedSender<Action>,
    position: Position,
    result: Option<GameResult>,
}

impl BoardWidget for TuiBoardWidget {
    fn render(&mut self, position: &Position) {
        if *position == self.position {
            return;
        }
        self.position = position.clone();
        let _ = self.action_tx.send(Action::BoardPosition {
            board_id: self.board_id,
            position: position.clone(),
        });
    }

    fn show_result(&mut self, result: Option<GameResult>) {
        if result == self.result {
            return;
        }
        self.result = result;
        let _ = self.action_tx.send(Action::BoardResult {
            board_id: self.board_id,
            result,
        });
    }

    fn destroy(&mut self) {
        let _ = self.action_tx.send(Action::BoardRemoved(self.board_id));
    }
}
