//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Number of cells on the canonical 3x3 board.
pub const BOARD_CELLS: usize = 9;

/// One of the two player symbols.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Symbol {
    /// The first participant's symbol (moves first).
    X,
    /// The second participant's symbol.
    O,
}

impl Symbol {
    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square occupied by a symbol.
    Occupied(Symbol),
}

impl Square {
    /// Returns the occupying symbol, if any.
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Square::Empty => None,
            Square::Occupied(symbol) => Some(symbol),
        }
    }
}

/// Error raised when writing to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    /// Cell index is not in `0..9`.
    #[display("Cell {} is out of range (must be 0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),
}

/// 3x3 tic-tac-toe board.
///
/// On the wire the board is a 9-element array of `"X"`, `"O"` or `null`
/// in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[Option<Symbol>; 9]", from = "[Option<Symbol>; 9]")]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; BOARD_CELLS],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given index, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<Square> {
        self.squares.get(index).copied()
    }

    /// Sets the square at the given index.
    pub fn set(&mut self, index: usize, square: Square) -> Result<(), BoardError> {
        let slot = self
            .squares
            .get_mut(index)
            .ok_or(BoardError::OutOfRange(index))?;
        *slot = square;
        Ok(())
    }

    /// Checks if the square at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Square::Empty))
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; BOARD_CELLS] {
        &self.squares
    }

    /// Number of occupied squares.
    pub fn occupied_count(&self) -> usize {
        self.squares
            .iter()
            .filter(|square| **square != Square::Empty)
            .count()
    }

    /// Returns the board as the client sees it.
    pub fn cells(&self) -> [Option<Symbol>; BOARD_CELLS] {
        self.squares.map(Square::symbol)
    }

    /// Formats the board as a human-readable grid, `_` marking empty cells.
    pub fn display(&self) -> String {
        self.squares
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|square| match square {
                        Square::Empty => "_".to_string(),
                        Square::Occupied(symbol) => symbol.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n---------\n")
    }
}

impl From<Board> for [Option<Symbol>; BOARD_CELLS] {
    fn from(board: Board) -> Self {
        board.cells()
    }
}

impl From<[Option<Symbol>; BOARD_CELLS]> for Board {
    fn from(cells: [Option<Symbol>; BOARD_CELLS]) -> Self {
        Self {
            squares: cells.map(|cell| cell.map_or(Square::Empty, Square::Occupied)),
        }
    }
}
