//! Terminal outcomes.

use crate::rules::{check_winner, is_draw};
use crate::{Board, Symbol};
use tracing::instrument;

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Outcome {
    /// A symbol completed a line.
    #[display("{} wins", _0)]
    Winner(Symbol),
    /// Nine moves, no line.
    #[display("Draw")]
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Symbol> {
        match self {
            Outcome::Winner(symbol) => Some(*symbol),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// Evaluates a board after `move_count` moves.
///
/// A winner is checked before a draw, so a ninth move that completes a
/// line is a win.
#[instrument(skip(board))]
pub fn evaluate(board: &Board, move_count: usize) -> Option<Outcome> {
    if let Some(symbol) = check_winner(board) {
        Some(Outcome::Winner(symbol))
    } else if is_draw(board, move_count) {
        Some(Outcome::Draw)
    } else {
        None
    }
}
