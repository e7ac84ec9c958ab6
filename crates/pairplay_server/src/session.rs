//! A single two-player game session.

use crate::error::{GameError, MoveRejection};
use crate::ids::{ConnectionId, SessionId};
use derive_getters::Getters;
use pairplay_tictactoe::{Board, Outcome, Square, Symbol, evaluate};
use tracing::{debug, info, instrument, warn};

/// Status of a session after an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// The game continues.
    InProgress,
    /// A symbol completed a line.
    Winner(Symbol),
    /// Nine moves, no line.
    Draw,
}

impl MoveStatus {
    /// True for `Winner` and `Draw`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MoveStatus::InProgress)
    }
}

impl From<Option<Outcome>> for MoveStatus {
    fn from(outcome: Option<Outcome>) -> Self {
        match outcome {
            None => MoveStatus::InProgress,
            Some(Outcome::Winner(symbol)) => MoveStatus::Winner(symbol),
            Some(Outcome::Draw) => MoveStatus::Draw,
        }
    }
}

/// Data produced by an accepted move.
///
/// The session never notifies anyone itself; the dispatcher turns this into
/// notifications for both participants.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveResult {
    /// Session the move was applied to.
    session_id: SessionId,
    /// Connection that made the move.
    mover: ConnectionId,
    /// Board snapshot after the move.
    board: Board,
    /// Outcome evaluation after the move.
    status: MoveStatus,
}

impl MoveResult {
    /// True if the move ended the game.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One live game between two connections.
///
/// Participant 0 plays X and moves first; participant 1 plays O.
#[derive(Debug, Clone, Getters)]
pub struct GameSession {
    /// Session ID.
    id: SessionId,
    /// The board.
    board: Board,
    /// Participants indexed by seat: `[X, O]`.
    participants: [ConnectionId; 2],
    /// Seat index of the connection to move.
    #[getter(skip)]
    turn: usize,
    /// Number of accepted moves; always equals the occupied cell count.
    move_count: usize,
    /// Status after the last accepted move.
    status: MoveStatus,
}

impl GameSession {
    /// Creates a session with `first` as X (to move) and `second` as O.
    #[instrument(skip_all, fields(first = %first, second = %second))]
    pub fn new(first: ConnectionId, second: ConnectionId) -> Self {
        let id = SessionId::generate();
        info!(session_id = %id, "Creating new game session");
        Self {
            id,
            board: Board::new(),
            participants: [first, second],
            turn: 0,
            move_count: 0,
            status: MoveStatus::InProgress,
        }
    }

    fn seat_of(&self, connection: &ConnectionId) -> Option<usize> {
        self.participants.iter().position(|p| p == connection)
    }

    /// Returns the symbol assigned to `connection`, if it plays here.
    pub fn symbol_of(&self, connection: &ConnectionId) -> Option<Symbol> {
        self.seat_of(connection).map(seat_symbol)
    }

    /// Returns the other participant, if `of` plays here.
    pub fn opponent(&self, of: &ConnectionId) -> Option<&ConnectionId> {
        self.seat_of(of).map(|seat| &self.participants[1 - seat])
    }

    /// Returns the connection holding the turn.
    pub fn current_turn(&self) -> &ConnectionId {
        &self.participants[self.turn]
    }

    /// True once a winner or draw was reached.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a move by `connection` at `cell_index`.
    ///
    /// Every rejection leaves the session unchanged.
    #[instrument(skip(self), fields(session_id = %self.id, connection_id = %connection))]
    pub fn apply_move(
        &mut self,
        connection: &ConnectionId,
        cell_index: usize,
    ) -> Result<MoveResult, GameError> {
        let seat = self
            .seat_of(connection)
            .ok_or(MoveRejection::NotAParticipant)?;

        if self.is_terminal() {
            return Err(MoveRejection::GameOver.into());
        }

        if seat != self.turn {
            warn!(
                expected = %self.current_turn(),
                "Player tried to move out of turn"
            );
            return Err(MoveRejection::NotYourTurn.into());
        }

        match self.board.get(cell_index) {
            None => return Err(MoveRejection::OutOfRange(cell_index).into()),
            Some(Square::Occupied(_)) => {
                return Err(MoveRejection::CellOccupied(cell_index).into());
            }
            Some(Square::Empty) => {}
        }

        let symbol = seat_symbol(seat);
        self.board
            .set(cell_index, Square::Occupied(symbol))
            .map_err(|_| MoveRejection::OutOfRange(cell_index))?;
        self.move_count += 1;
        self.turn = 1 - seat;
        self.status = evaluate(&self.board, self.move_count).into();

        debug_assert_eq!(self.move_count, self.board.occupied_count());
        debug!(
            %symbol,
            cell_index,
            move_count = self.move_count,
            status = ?self.status,
            "Move applied"
        );

        Ok(MoveResult {
            session_id: self.id.clone(),
            mover: connection.clone(),
            board: self.board.clone(),
            status: self.status,
        })
    }
}

fn seat_symbol(seat: usize) -> Symbol {
    if seat == 0 { Symbol::X } else { Symbol::O }
}
