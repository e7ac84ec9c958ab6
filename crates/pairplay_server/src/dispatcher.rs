//! Connection registry and event routing.
//!
//! The [`Dispatcher`] is the single owner of all mutable game state: the
//! matchmaking pool, every live [`GameSession`], the registry mapping each
//! connection to its session, and the outbound channel of each connection.
//! The transport calls one method per inbound event; each call runs to
//! completion before the next begins.

use crate::error::GameError;
use crate::ids::{ConnectionId, SessionId};
use crate::matchmaker::{MatchEvent, Matchmaker};
use crate::protocol::{ClientMessage, ServerMessage, Winner};
use crate::session::{GameSession, MoveResult, MoveStatus};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Outbound channel of one connection.
pub type Outbox = UnboundedSender<ServerMessage>;

/// Dispatcher shared between socket tasks.
///
/// The lock is held for a whole event so the notifications of one move are
/// never interleaved with another move's.
pub type SharedDispatcher = Arc<Mutex<Dispatcher>>;

/// Snapshot of dispatcher occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters)]
pub struct DispatcherStats {
    /// Open connections.
    connections: usize,
    /// Connections waiting for an opponent.
    waiting: usize,
    /// Live sessions.
    sessions: usize,
}

/// Routes connection events to the matchmaker and sessions.
#[derive(Debug, Default)]
pub struct Dispatcher {
    matchmaker: Matchmaker,
    sessions: HashMap<SessionId, GameSession>,
    registry: HashMap<ConnectionId, SessionId>,
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a new dispatcher for sharing across tasks.
    pub fn shared() -> SharedDispatcher {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Handles a new connection: queue it or pair it.
    #[instrument(skip(self, outbox), fields(connection_id = %connection))]
    pub fn connect(&mut self, connection: ConnectionId, outbox: Outbox) {
        if self.outboxes.contains_key(&connection) {
            warn!("Connection already registered, ignoring connect");
            return;
        }
        info!("A user connected");
        self.outboxes.insert(connection.clone(), outbox);

        match self.matchmaker.on_connect(connection.clone()) {
            MatchEvent::Waiting => self.send(&connection, ServerMessage::waiting()),
            MatchEvent::Paired(session) => self.start_session(session),
        }
    }

    fn start_session(&mut self, session: GameSession) {
        let session_id = session.id().clone();
        for player in session.participants() {
            self.registry.insert(player.clone(), session_id.clone());
        }

        for player in session.participants() {
            let (Some(symbol), Some(opponent)) =
                (session.symbol_of(player), session.opponent(player))
            else {
                continue;
            };
            self.send(
                player,
                ServerMessage::GameStart {
                    session_id: session_id.clone(),
                    symbol,
                    opponent_id: opponent.clone(),
                },
            );
        }

        info!(
            session_id = %session_id,
            x = %session.participants()[0],
            o = %session.participants()[1],
            "Game started"
        );
        self.sessions.insert(session_id, session);
    }

    /// Handles a move request from `connection`.
    ///
    /// On success both participants receive `update_board`, followed by
    /// `game_over` if the move ended the game. On failure only the caller
    /// receives an `error`; no state changes.
    #[instrument(skip(self), fields(connection_id = %connection, session_id = %session_id))]
    pub fn make_move(
        &mut self,
        connection: &ConnectionId,
        session_id: &SessionId,
        cell_index: usize,
    ) -> Result<MoveResult, GameError> {
        match self.apply_move(connection, session_id, cell_index) {
            Ok(result) => {
                self.broadcast_move(&result);
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Move rejected");
                self.send(connection, ServerMessage::error(&err));
                Err(err)
            }
        }
    }

    fn apply_move(
        &mut self,
        connection: &ConnectionId,
        session_id: &SessionId,
        cell_index: usize,
    ) -> Result<MoveResult, GameError> {
        let no_such_session = || GameError::NoSuchSession(session_id.clone());

        if self.registry.get(connection) != Some(session_id) {
            return Err(no_such_session());
        }
        let session = self.sessions.get_mut(session_id).ok_or_else(no_such_session)?;
        session.apply_move(connection, cell_index)
    }

    fn broadcast_move(&mut self, result: &MoveResult) {
        let session_id = result.session_id();
        let Some(participants) = self
            .sessions
            .get(session_id)
            .map(|s| s.participants().clone())
        else {
            return;
        };

        debug!("Board after move:\n{}", result.board().display());
        for player in &participants {
            self.send(
                player,
                ServerMessage::UpdateBoard {
                    session_id: session_id.clone(),
                    board: result.board().clone(),
                },
            );
        }

        let winner = match result.status() {
            MoveStatus::InProgress => return,
            MoveStatus::Winner(symbol) => Winner::from(*symbol),
            MoveStatus::Draw => Winner::Draw,
        };

        for player in &participants {
            self.send(
                player,
                ServerMessage::GameOver {
                    session_id: session_id.clone(),
                    winner,
                },
            );
        }
        info!(session_id = %session_id, ?winner, "Game over");
        self.evict(session_id);
    }

    /// Handles a closed connection.
    ///
    /// Removes it from the pool, or ends its session and tells the remaining
    /// participant. Returns the ended session, if any.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Option<SessionId> {
        info!("A user disconnected");
        self.outboxes.remove(connection);
        self.matchmaker.on_disconnect(connection);

        let session_id = self.registry.get(connection).cloned()?;
        let session = self.evict(&session_id)?;

        if let Some(opponent) = session.opponent(connection) {
            self.send(
                opponent,
                ServerMessage::GameOver {
                    session_id: session_id.clone(),
                    winner: Winner::OpponentDisconnected,
                },
            );
        }
        info!(session_id = %session_id, reason = %GameError::OpponentDisconnected, "Game over");
        Some(session_id)
    }

    /// Routes a parsed client frame.
    #[instrument(skip(self, message), fields(connection_id = %connection))]
    pub fn handle(
        &mut self,
        connection: &ConnectionId,
        message: ClientMessage,
    ) -> Result<(), GameError> {
        match message {
            ClientMessage::MakeMove {
                session_id,
                cell_index,
            } => self
                .make_move(connection, &session_id, cell_index)
                .map(|_| ()),
        }
    }

    /// Sends a notification to one connection.
    ///
    /// A missing or closed channel is logged and otherwise ignored.
    #[instrument(skip(self, message), fields(connection_id = %connection))]
    pub fn send(&self, connection: &ConnectionId, message: ServerMessage) {
        match self.outboxes.get(connection) {
            Some(outbox) => {
                if outbox.send(message).is_err() {
                    warn!(connection_id = %connection, "Outbound channel closed");
                }
            }
            None => warn!(connection_id = %connection, "No outbound channel for connection"),
        }
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    fn evict(&mut self, session_id: &SessionId) -> Option<GameSession> {
        let session = self.sessions.remove(session_id)?;
        for player in session.participants() {
            self.registry.remove(player);
        }
        debug!(session_id = %session_id, "Session evicted");
        Some(session)
    }

    /// Session the connection currently plays in.
    pub fn session_of(&self, connection: &ConnectionId) -> Option<&SessionId> {
        self.registry.get(connection)
    }

    /// Looks up a live session.
    pub fn session(&self, session_id: &SessionId) -> Option<&GameSession> {
        self.sessions.get(session_id)
    }

    /// Number of live sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Connections waiting for an opponent, oldest first.
    pub fn waiting(&self) -> Vec<ConnectionId> {
        self.matchmaker.waiting().cloned().collect()
    }

    /// Number of open connections.
    pub fn connected(&self) -> usize {
        self.outboxes.len()
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            connections: self.connected(),
            waiting: self.matchmaker.waiting_count(),
            sessions: self.active_sessions(),
        }
    }
}
