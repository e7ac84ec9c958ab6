//! Pairplay server library - matchmaking and session routing
//!
//! Anonymous clients connect over a WebSocket, wait in a FIFO pool, and are
//! paired into two-player tic-tac-toe sessions.
//!
//! # Architecture
//!
//! - **Session**: one game's board, symbol assignment, and turn order
//! - **Matchmaker**: FIFO pool of connections awaiting an opponent
//! - **Dispatcher**: connection registry; routes events and notifications
//! - **Transport**: axum WebSocket adapter feeding the dispatcher
//!
//! # Example
//!
//! ```
//! use pairplay_server::{ConnectionId, Dispatcher, ServerMessage};
//! use tokio::sync::mpsc;
//!
//! let mut dispatcher = Dispatcher::new();
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! dispatcher.connect(ConnectionId::from("alice"), tx);
//! assert!(matches!(rx.try_recv(), Ok(ServerMessage::Waiting { .. })));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod dispatcher;
mod error;
mod ids;
mod matchmaker;
mod protocol;
mod session;
mod transport;

// Crate-level exports - Configuration
pub use config::{ConfigError, HOST_ENV, PORT_ENV, ServerConfig};

// Crate-level exports - Routing
pub use dispatcher::{Dispatcher, DispatcherStats, Outbox, SharedDispatcher};

// Crate-level exports - Errors
pub use error::{GameError, MoveRejection};

// Crate-level exports - Identifiers
pub use ids::{ConnectionId, SessionId};

// Crate-level exports - Matchmaking
pub use matchmaker::{MatchEvent, Matchmaker};

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, ServerMessage, Winner};

// Crate-level exports - Sessions
pub use session::{GameSession, MoveResult, MoveStatus};

// Crate-level exports - Transport
pub use transport::{HealthResponse, lock, router, serve};

// Crate-level exports - Game types
pub use pairplay_tictactoe::{Board, Square, Symbol};
