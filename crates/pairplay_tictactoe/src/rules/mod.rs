//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart from
//! board storage so the session layer can compose them.

mod draw;
mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner};
