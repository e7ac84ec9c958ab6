//! JSON wire messages exchanged with clients.
//!
//! Every frame is `{"event": <name>, "data": {...}}`. Field names are
//! camelCase.

use crate::ids::{ConnectionId, SessionId};
use pairplay_tictactoe::{Board, Symbol};
use serde::{Deserialize, Serialize};

/// Inbound events sent by a client over its socket.
///
/// `connect` and `disconnect` come from the transport itself and have no
/// frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Place the caller's symbol on `cell_index` in `session_id`.
    MakeMove {
        /// Session the move targets.
        session_id: SessionId,
        /// Board cell, 0-8 in row-major order.
        cell_index: usize,
    },
}

/// Final result announced in `game_over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// Board filled with no line.
    #[serde(rename = "draw")]
    Draw,
    /// The other participant left.
    #[serde(rename = "opponent_disconnected")]
    OpponentDisconnected,
}

impl From<Symbol> for Winner {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Winner::X,
            Symbol::O => Winner::O,
        }
    }
}

/// Outbound notifications addressed to a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// No opponent is available yet.
    Waiting {
        /// Human-readable status.
        message: String,
    },
    /// A session was created with this connection in it.
    GameStart {
        /// New session.
        session_id: SessionId,
        /// Symbol assigned to the recipient.
        symbol: Symbol,
        /// The other participant.
        opponent_id: ConnectionId,
    },
    /// Board after an accepted move.
    UpdateBoard {
        /// Session the board belongs to.
        session_id: SessionId,
        /// Nine cells of `"X"`, `"O"` or `null`.
        board: Board,
    },
    /// The session ended and no longer exists.
    GameOver {
        /// Session that ended.
        session_id: SessionId,
        /// Final result.
        winner: Winner,
    },
    /// A request from the recipient was rejected.
    Error {
        /// Reason for the rejection.
        message: String,
    },
}

impl ServerMessage {
    /// Builds the `waiting` notification.
    pub fn waiting() -> Self {
        ServerMessage::Waiting {
            message: "Waiting for an opponent...".to_string(),
        }
    }

    /// Builds an `error` notification from any displayable error.
    pub fn error(err: impl std::fmt::Display) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
        }
    }
}
