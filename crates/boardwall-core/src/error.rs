// ── Core error types ──
//
// Dashboard-facing errors from boardwall-core. Consumers never see raw
// reqwest errors or JSON decode failures; the `From<boardwall_api::Error>`
// impl translates transport-layer errors into these variants.

use thiserror::Error;

use crate::model::BoardId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Backend errors ───────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    BackendUnreachable { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend error: {message}")]
    Backend {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Malformed snapshot for board {board_id}: missing {missing}")]
    MalformedSnapshot {
        board_id: BoardId,
        missing: &'static str,
    },

    // ── Rendering errors ─────────────────────────────────────────────
    #[error("Widget for board {board_id} failed: {message}")]
    Widget { board_id: BoardId, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Transient failures are retried by the next poll tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnreachable { .. } | Self::Timeout)
            || matches!(self, Self::Backend { status: Some(s), .. } if *s >= 500)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<boardwall_api::Error> for CoreError {
    fn from(err: boardwall_api::Error) -> Self {
        match err {
            boardwall_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::BackendUnreachable {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Backend {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            boardwall_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            boardwall_api::Error::Tls(msg) => CoreError::BackendUnreachable {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            boardwall_api::Error::Http { status, message } => CoreError::Backend {
                message,
                status: Some(status),
            },
            boardwall_api::Error::BackendUnavailable { attempts } => {
                CoreError::BackendUnreachable {
                    url: String::new(),
                    reason: format!("no answer after {attempts} attempts"),
                }
            }
            boardwall_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
