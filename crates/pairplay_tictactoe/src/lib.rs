//! Pure tic-tac-toe logic for pairplay.
//!
//! This crate holds the board, the two player symbols, and the rules that
//! decide whether a board is won or drawn. It performs no I/O and holds no
//! session state; the server crate owns turn order and participants.
//!
//! # Example
//!
//! ```
//! use pairplay_tictactoe::{Board, Square, Symbol, check_winner};
//!
//! let mut board = Board::new();
//! for index in [0, 1, 2] {
//!     board.set(index, Square::Occupied(Symbol::X)).unwrap();
//! }
//! assert_eq!(check_winner(&board), Some(Symbol::X));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod outcome;
mod rules;
mod types;

pub use outcome::{Outcome, evaluate};
pub use rules::{LINES, check_winner, is_draw, is_full};
pub use types::{BOARD_CELLS, Board, BoardError, Square, Symbol};
