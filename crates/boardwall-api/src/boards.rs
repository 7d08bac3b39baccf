// Board endpoints
//
// Game lifecycle (start all, restart one) and board snapshots.

use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::types::{BoardResponse, BoardsResponse};

impl BackendClient {
    /// Ask the backend to seat a game on every board.
    ///
    /// `POST /start_games`
    pub async fn start_games(&self) -> Result<(), Error> {
        debug!("starting games on all boards");
        self.post_empty("start_games").await
    }

    /// Reset one board and seat a fresh pairing on it.
    ///
    /// `POST /start_game/{id}`
    pub async fn start_game(&self, board_id: u32) -> Result<(), Error> {
        debug!(board_id, "starting game");
        self.post_empty(&format!("start_game/{board_id}")).await
    }

    /// List every board with its current position and pairing.
    ///
    /// `GET /get_boards`
    pub async fn get_boards(&self) -> Result<Vec<BoardResponse>, Error> {
        let envelope: BoardsResponse = self.get("get_boards").await?;
        Ok(envelope.boards)
    }

    /// Latest snapshot of a single board, including the PGN.
    ///
    /// `GET /get_board/{id}`
    pub async fn get_board(&self, board_id: u32) -> Result<BoardResponse, Error> {
        self.get(&format!("get_board/{board_id}")).await
    }
}
