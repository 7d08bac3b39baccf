// ── Backend seam ──
//
// Everything the dashboard needs from the game server, expressed over
// domain types. `BackendClient` is the production implementation; tests
// substitute a scripted one.

use std::future::Future;

use bytes::Bytes;

use boardwall_api::BackendClient;
use boardwall_api::types::BoardResponse;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Board, BoardId, SystemInfo};

/// Operations the dashboard performs against the game server.
pub trait Backend: Send + Sync + 'static {
    fn start_games(&self) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn start_game(&self, board_id: BoardId) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Every well-formed board. A listed board without an id or a position
    /// is skipped; the rest are still returned.
    fn get_boards(&self) -> impl Future<Output = Result<Vec<Board>, CoreError>> + Send;

    /// Latest snapshot of one board.
    fn get_board(&self, board_id: BoardId) -> impl Future<Output = Result<Board, CoreError>> + Send;

    fn system_info(&self) -> impl Future<Output = Result<SystemInfo, CoreError>> + Send;

    fn cpu_usage(&self) -> impl Future<Output = Result<Vec<f64>, CoreError>> + Send;

    fn list_images(&self) -> impl Future<Output = Result<Vec<String>, CoreError>> + Send;

    fn fetch_asset(&self, path: &str) -> impl Future<Output = Result<Bytes, CoreError>> + Send;
}

impl Backend for BackendClient {
    async fn start_games(&self) -> Result<(), CoreError> {
        Ok(BackendClient::start_games(self).await?)
    }

    async fn start_game(&self, board_id: BoardId) -> Result<(), CoreError> {
        Ok(BackendClient::start_game(self, board_id.0).await?)
    }

    async fn get_boards(&self) -> Result<Vec<Board>, CoreError> {
        Ok(valid_boards(BackendClient::get_boards(self).await?))
    }

    async fn get_board(&self, board_id: BoardId) -> Result<Board, CoreError> {
        let resp = BackendClient::get_board(self, board_id.0).await?;
        Board::from_snapshot(board_id, resp)
    }

    async fn system_info(&self) -> Result<SystemInfo, CoreError> {
        Ok(BackendClient::system_info(self).await?.into())
    }

    async fn cpu_usage(&self) -> Result<Vec<f64>, CoreError> {
        Ok(BackendClient::cpu_usage(self).await?)
    }

    async fn list_images(&self) -> Result<Vec<String>, CoreError> {
        Ok(BackendClient::list_images(self).await?)
    }

    async fn fetch_asset(&self, path: &str) -> Result<Bytes, CoreError> {
        Ok(BackendClient::fetch_asset(self, path).await?)
    }
}

/// Keep the listed boards that convert, logging the ones that do not.
fn valid_boards(listing: Vec<BoardResponse>) -> Vec<Board> {
    listing
        .into_iter()
        .enumerate()
        .filter_map(|(index, resp)| match Board::try_from(resp) {
            Ok(board) => Some(board),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed board in listing");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(id: Option<u32>, fen: Option<&str>) -> BoardResponse {
        BoardResponse {
            id,
            fen: fen.map(str::to_owned),
            ..BoardResponse::default()
        }
    }

    #[test]
    fn malformed_listing_entries_do_not_sink_the_rest() {
        let start = crate::model::Position::START;
        let boards = valid_boards(vec![
            listed(Some(1), Some(start)),
            listed(Some(2), None),
            listed(None, Some(start)),
            listed(Some(3), Some(start)),
        ]);

        let ids: Vec<BoardId> = boards.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BoardId(1), BoardId(3)]);
    }

    #[test]
    fn empty_listing_is_empty() {
        assert!(valid_boards(Vec::new()).is_empty());
    }
}
