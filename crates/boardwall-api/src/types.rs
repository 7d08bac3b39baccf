// Wire types for the backend JSON contract.
//
// Every field the dashboard cannot live without is still optional here:
// the backend occasionally answers mid-reset with a partial body, and the
// decision whether that is fatal belongs to the consumer, not the decoder.

use serde::{Deserialize, Serialize};

/// One board as returned by `/get_boards` and `/get_board/:id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoardResponse {
    #[serde(default)]
    pub id: Option<u32>,
    /// Position in Forsyth-Edwards Notation.
    #[serde(default)]
    pub fen: Option<String>,
    /// Full PGN text including headers. `/get_boards` omits it.
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub games: Vec<GameResponse>,
}

/// The pairing currently seated at a board.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameResponse {
    pub player1: ProfileResponse,
    pub player2: ProfileResponse,
}

/// Player profile. The backend sends extra bookkeeping fields
/// (`uci_elo`, `opponents`) that the dashboard ignores.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileResponse {
    pub name: String,
    #[serde(default)]
    pub elo: i32,
    #[serde(default)]
    pub profile_image: String,
}

/// `GET /get_boards` envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BoardsResponse {
    #[serde(default)]
    pub boards: Vec<BoardResponse>,
}

/// `GET /get_system_info`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SystemInfoResponse {
    pub cpu_cores: u32,
    pub num_boards: u32,
    pub total_memory_gb: f64,
}

/// `GET /cpu`: per-core utilization, 0-100.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CpuResponse {
    #[serde(default)]
    pub cpu: Vec<f64>,
}
