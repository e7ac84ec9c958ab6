//! HTTP and WebSocket adapter around the [`Dispatcher`].
//!
//! Each accepted socket becomes one connection. Its inbound frames are
//! decoded and handed to the dispatcher; a forwarding task drains its
//! outbound channel into the socket.

use crate::config::ServerConfig;
use crate::dispatcher::{Dispatcher, DispatcherStats, SharedDispatcher};
use crate::ids::ConnectionId;
use crate::protocol::{ClientMessage, ServerMessage};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::{MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: &'static str,
    /// Current occupancy.
    #[serde(flatten)]
    pub stats: DispatcherStats,
}

/// Locks the dispatcher, recovering the state if a previous holder panicked.
pub fn lock(dispatcher: &SharedDispatcher) -> MutexGuard<'_, Dispatcher> {
    dispatcher.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builds the router: `/ws` for games, `/health` for probes.
#[instrument(skip_all)]
pub fn router(dispatcher: SharedDispatcher) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(dispatcher)
}

/// Binds the configured address and serves until Ctrl+C.
#[instrument(skip_all, fields(addr = %config.bind_addr()))]
pub async fn serve(config: &ServerConfig, dispatcher: SharedDispatcher) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health(State(dispatcher): State<SharedDispatcher>) -> Json<HealthResponse> {
    let stats = lock(&dispatcher).stats();
    Json(HealthResponse { status: "ok", stats })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(dispatcher): State<SharedDispatcher>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, dispatcher))
}

#[instrument(skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, dispatcher: SharedDispatcher) {
    let connection = ConnectionId::generate();
    tracing::Span::current().record("connection_id", tracing::field::display(&connection));

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Ends once the dispatcher drops this connection's sender.
    let forward = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(err) => {
                    error!(error = %err, "Failed to encode notification");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    lock(&dispatcher).connect(connection.clone(), tx);

    while let Some(frame) = receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                debug!(error = %err, "Socket read failed");
                break;
            }
        };
        if handle_frame(&dispatcher, &connection, frame).is_break() {
            break;
        }
    }

    lock(&dispatcher).disconnect(&connection);
    if let Err(err) = forward.await {
        warn!(error = %err, "Forwarding task failed");
    }
}

/// Routes one inbound frame. `Break` means the client closed the socket.
#[instrument(skip(dispatcher, frame), fields(connection_id = %connection))]
fn handle_frame(
    dispatcher: &SharedDispatcher,
    connection: &ConnectionId,
    frame: Message,
) -> ControlFlow<()> {
    match frame {
        Message::Text(text) => {
            handle_text(dispatcher, connection, text.as_str());
            ControlFlow::Continue(())
        }
        Message::Close(_) => ControlFlow::Break(()),
        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => ControlFlow::Continue(()),
    }
}

#[instrument(skip(dispatcher, text), fields(connection_id = %connection))]
fn handle_text(dispatcher: &SharedDispatcher, connection: &ConnectionId, text: &str) {
    let mut dispatcher = lock(dispatcher);
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => {
            if let Err(err) = dispatcher.handle(connection, message) {
                debug!(error = %err, "Request rejected");
            }
        }
        Err(err) => {
            warn!(connection_id = %connection, error = %err, "Unparseable frame");
            dispatcher.send(
                connection,
                ServerMessage::error(format!("Invalid message: {}", err)),
            );
        }
    }
}
