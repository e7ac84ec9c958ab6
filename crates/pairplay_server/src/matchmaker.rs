//! FIFO matchmaking of unattached connections.

use crate::ids::ConnectionId;
use crate::session::GameSession;
use std::collections::VecDeque;
use tracing::{debug, info, instrument};

/// Result of a connection joining the pool.
#[derive(Debug)]
pub enum MatchEvent {
    /// No opponent yet; the connection waits in the pool.
    Waiting,
    /// Two connections were paired into a new session.
    ///
    /// The older pool entry plays X, the newer plays O.
    Paired(GameSession),
}

/// Owns the pool of connections awaiting an opponent.
///
/// A connection is either in this pool or in a session, never both.
#[derive(Debug, Default)]
pub struct Matchmaker {
    pool: VecDeque<ConnectionId>,
}

impl Matchmaker {
    /// Creates an empty matchmaker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `connection` and pairs the two oldest entries if possible.
    ///
    /// A connection already in the pool is not queued twice.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn on_connect(&mut self, connection: ConnectionId) -> MatchEvent {
        if self.pool.contains(&connection) {
            debug!("Connection already waiting");
        } else {
            self.pool.push_back(connection);
        }

        if self.pool.len() < 2 {
            info!(waiting = self.pool.len(), "Waiting for an opponent");
            return MatchEvent::Waiting;
        }

        match (self.pool.pop_front(), self.pool.pop_front()) {
            (Some(first), Some(second)) => {
                info!(x = %first, o = %second, "Pairing connections");
                MatchEvent::Paired(GameSession::new(first, second))
            }
            (first, _) => {
                self.pool.extend(first);
                MatchEvent::Waiting
            }
        }
    }

    /// Removes `connection` from the pool. Returns whether it was queued.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn on_disconnect(&mut self, connection: &ConnectionId) -> bool {
        let before = self.pool.len();
        self.pool.retain(|waiting| waiting != connection);
        let removed = self.pool.len() != before;
        if removed {
            info!("Removed connection from waiting pool");
        }
        removed
    }

    /// Connections waiting, oldest first.
    pub fn waiting(&self) -> impl Iterator<Item = &ConnectionId> {
        self.pool.iter()
    }

    /// Number of waiting connections.
    pub fn waiting_count(&self) -> usize {
        self.pool.len()
    }

    /// True if `connection` is waiting.
    pub fn is_waiting(&self, connection: &ConnectionId) -> bool {
        self.pool.contains(connection)
    }
}
