//! Draw detection logic for tic-tac-toe.

use super::win::check_winner;
use crate::{BOARD_CELLS, Board, Square};
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// A draw is nine moves played with no completed line.
#[instrument(skip(board))]
pub fn is_draw(board: &Board, move_count: usize) -> bool {
    move_count == BOARD_CELLS && check_winner(board).is_none()
}
