//! Win detection logic for tic-tac-toe.

use crate::{Board, Square, Symbol};
use tracing::instrument;

/// The eight winning lines, scanned in this order: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if there is a winner on the board.
///
/// Returns the symbol of the first line in [`LINES`] whose three cells hold
/// the same symbol, `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Symbol> {
    let squares = board.squares();
    LINES.iter().find_map(|&[a, b, c]| match squares[a] {
        Square::Occupied(symbol) if squares[b] == squares[a] && squares[c] == squares[a] => {
            Some(symbol)
        }
        _ => None,
    })
}
