//! Error types for session and dispatch failures.

use crate::ids::SessionId;
use derive_more::{Display, Error};

/// Why a move was refused. The session is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveRejection {
    /// The caller does not play in this session.
    #[display("You are not a participant in this game")]
    NotAParticipant,

    /// The session already reached a terminal outcome.
    #[display("Game is already over")]
    GameOver,

    /// The other participant holds the turn.
    #[display("It's not your turn")]
    NotYourTurn,

    /// The cell index is not in `0..9`.
    #[display("Cell {} is out of range (must be 0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),

    /// The cell is already taken.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] usize),
}

/// Failures surfaced at the dispatcher boundary.
///
/// None of these are fatal to the process; each becomes a notification to
/// the affected connection.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// The move was illegal for the current game state.
    #[display("Invalid move: {}", _0)]
    InvalidGameState(MoveRejection),

    /// The referenced session does not exist or already finished.
    #[display("No such game session: {}", _0)]
    NoSuchSession(#[error(not(source))] SessionId),

    /// The other participant left mid-game.
    #[display("Opponent disconnected")]
    OpponentDisconnected,
}

impl From<MoveRejection> for GameError {
    fn from(rejection: MoveRejection) -> Self {
        GameError::InvalidGameState(rejection)
    }
}
