// ── Domain model ──
//
// Validated counterparts of the boardwall-api wire types. A `Board` always
// carries a position; snapshots without one are rejected at conversion.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use boardwall_api::types::{
    BoardResponse, GameResponse, ProfileResponse, SystemInfoResponse,
};

use crate::error::CoreError;

/// Stable identifier of a board slot. A new game on the same slot keeps the id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoardId(pub u32);

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for BoardId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A position in Forsyth-Edwards Notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(String);

impl Position {
    pub const START: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub fn new(fen: impl Into<String>) -> Self {
        Self(fen.into())
    }

    /// The standard starting position.
    pub fn start() -> Self {
        Self::new(Self::START)
    }

    pub fn as_fen(&self) -> &str {
        &self.0
    }

    /// Piece placement field (the first FEN field).
    pub fn placement(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or_default()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final outcome recorded in a PGN `Result` header.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum GameResult {
    #[strum(serialize = "1-0")]
    WhiteWins,
    #[strum(serialize = "0-1")]
    BlackWins,
    #[strum(serialize = "1/2-1/2")]
    Draw,
}

impl GameResult {
    /// Detect a finished game by exact substring match on the Result tag.
    ///
    /// `[Result "*"]`, any other value, or no tag at all means the game is
    /// still running.
    pub fn from_pgn(pgn: &str) -> Option<Self> {
        Self::iter().find(|result| pgn.contains(&result.tag()))
    }

    /// The PGN header line for this result, e.g. `[Result "1-0"]`.
    pub fn tag(self) -> String {
        format!("[Result \"{self}\"]")
    }
}

/// A player as shown next to a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub elo: i32,
    pub profile_image: String,
}

/// The two players seated at a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub white: Profile,
    pub black: Profile,
}

/// One board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub position: Position,
    /// PGN text, empty when the backend did not send one.
    pub pgn: String,
    pub games: Vec<Pairing>,
}

impl Board {
    /// Convert a `/get_board/:id` response, trusting the requested id over
    /// whatever the body claims.
    pub fn from_snapshot(board_id: BoardId, resp: BoardResponse) -> Result<Self, CoreError> {
        let fen = resp.fen.ok_or(CoreError::MalformedSnapshot {
            board_id,
            missing: "fen",
        })?;

        Ok(Self {
            id: board_id,
            position: Position::new(fen),
            pgn: resp.pgn.unwrap_or_default(),
            games: resp.games.into_iter().map(Pairing::from).collect(),
        })
    }

    /// Outcome, if the PGN says the game is over.
    pub fn result(&self) -> Option<GameResult> {
        GameResult::from_pgn(&self.pgn)
    }

    pub fn is_terminal(&self) -> bool {
        self.result().is_some()
    }

    /// The pairing currently seated, if any.
    pub fn pairing(&self) -> Option<&Pairing> {
        self.games.first()
    }
}

impl TryFrom<BoardResponse> for Board {
    type Error = CoreError;

    fn try_from(resp: BoardResponse) -> Result<Self, Self::Error> {
        let id = resp.id.map(BoardId).ok_or(CoreError::MalformedSnapshot {
            board_id: BoardId::default(),
            missing: "id",
        })?;
        Self::from_snapshot(id, resp)
    }
}

impl From<ProfileResponse> for Profile {
    fn from(p: ProfileResponse) -> Self {
        Self {
            name: p.name,
            elo: p.elo,
            profile_image: p.profile_image,
        }
    }
}

impl From<GameResponse> for Pairing {
    fn from(g: GameResponse) -> Self {
        Self {
            white: g.player1.into(),
            black: g.player2.into(),
        }
    }
}

/// Host facts used to seed the initial layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub cpu_cores: u32,
    pub num_boards: u32,
    pub total_memory_gb: f64,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            cpu_cores: 4,
            num_boards: 4,
            total_memory_gb: 8.0,
        }
    }
}

impl From<SystemInfoResponse> for SystemInfo {
    fn from(s: SystemInfoResponse) -> Self {
        Self {
            cpu_cores: s.cpu_cores,
            num_boards: s.num_boards,
            total_memory_gb: s.total_memory_gb,
        }
    }
}

/// One CPU telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    /// Per-core utilization in percent (0-100).
    pub per_core: Vec<f64>,
    pub sampled_at: DateTime<Utc>,
}

impl CpuUsage {
    pub fn new(per_core: Vec<f64>) -> Self {
        Self {
            per_core,
            sampled_at: Utc::now(),
        }
    }

    /// Time since the sample was taken. Clock skew never yields a negative age.
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.sampled_at).to_std().unwrap_or_default()
    }

    /// Mean utilization across cores, 0 when no cores were reported.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn average(&self) -> f64 {
        if self.per_core.is_empty() {
            return 0.0;
        }
        self.per_core.iter().sum::<f64>() / self.per_core.len() as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn result_tags_match_exactly() {
        assert_eq!(
            GameResult::from_pgn("[Event \"x\"]\n[Result \"1-0\"]\n\n1. e4 1-0"),
            Some(GameResult::WhiteWins)
        );
        assert_eq!(
            GameResult::from_pgn("[Result \"0-1\"]"),
            Some(GameResult::BlackWins)
        );
        assert_eq!(
            GameResult::from_pgn("[Result \"1/2-1/2\"]"),
            Some(GameResult::Draw)
        );
    }

    #[test]
    fn unfinished_or_unknown_results_are_not_terminal() {
        assert_eq!(GameResult::from_pgn("[Result \"*\"]\n\n1. e4 *"), None);
        assert_eq!(GameResult::from_pgn(""), None);
        // Result text without the header framing does not count.
        assert_eq!(GameResult::from_pgn("1. e4 e5 1-0"), None);
        assert_eq!(GameResult::from_pgn("[Result \"1-0 \"]"), None);
    }

    #[test]
    fn result_roundtrips_through_strum() {
        assert_eq!("1/2-1/2".parse::<GameResult>().unwrap(), GameResult::Draw);
        assert_eq!(GameResult::BlackWins.tag(), "[Result \"0-1\"]");
    }

    #[test]
    fn sample_age_is_measured_from_sampled_at() {
        let usage = CpuUsage::new(vec![10.0]);
        let later = usage.sampled_at + chrono::Duration::seconds(4);
        assert_eq!(usage.age(later), std::time::Duration::from_secs(4));

        let earlier = usage.sampled_at - chrono::Duration::seconds(1);
        assert_eq!(usage.age(earlier), std::time::Duration::ZERO);
    }

    #[test]
    fn snapshot_without_fen_is_malformed() {
        let err = Board::from_snapshot(BoardId(7), BoardResponse::default()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MalformedSnapshot {
                board_id: BoardId(7),
                missing: "fen"
            }
        ));
    }

    #[test]
    fn listed_board_requires_id() {
        let resp = BoardResponse {
            fen: Some(Position::START.into()),
            ..BoardResponse::default()
        };
        assert!(Board::try_from(resp).is_err());
    }

    #[test]
    fn snapshot_conversion_maps_players() {
        let resp = BoardResponse {
            id: Some(99),
            fen: Some(Position::START.into()),
            pgn: None,
            games: vec![GameResponse {
                player1: ProfileResponse {
                    name: "Ada".into(),
                    elo: 1500,
                    profile_image: "ada.png".into(),
                },
                player2: ProfileResponse {
                    name: "Bob".into(),
                    elo: 1400,
                    profile_image: "bob.png".into(),
                },
            }],
        };

        let board = Board::from_snapshot(BoardId(2), resp).unwrap();
        assert_eq!(board.id, BoardId(2));
        assert_eq!(board.pgn, "");
        assert!(!board.is_terminal());
        let pairing = board.pairing().unwrap();
        assert_eq!(pairing.white.name, "Ada");
        assert_eq!(pairing.black.elo, 1400);
    }

    #[test]
    fn placement_is_first_fen_field() {
        assert_eq!(
            Position::start().placement(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn cpu_average() {
        assert!((CpuUsage::new(vec![10.0, 30.0]).average() - 20.0).abs() < f64::EPSILON);
        assert!(CpuUsage::new(Vec::new()).average().abs() < f64::EPSILON);
    }
}
