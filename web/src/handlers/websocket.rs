//! WebSocket observer stream.
//!
//! Observers receive every engine notification as it happens and may send
//! reservation commands over the same socket.
//!
//! # Architecture
//!
//! ```text
//! Client          WebSocket Handler          Engine
//!   │                    │                     │
//!   ├─ Connect ─────────>│ admit / 503         │
//!   │                    ├─ subscribe() ──────>│
//!   │<─ events_updated ──┤                     │
//!   │<─ user_count ──────┤                     │
//!   │                    │                     │
//!   ├─ Send Command ────>│                     │
//!   │                    ├─ send(action) ─────>│
//!   │<─ Result / Error ──┤                     │
//!   │                    │<── notification ────┤
//!   │<─ Event ───────────┤                     │
//! ```
//!
//! # Message Protocol
//!
//! **Client → Server (Command):**
//! ```json
//! { "type": "command", "command": { "reserve": { "event_id": 1, "user_name": "ana" } } }
//! ```
//!
//! **Server → Client (Event):**
//! ```json
//! { "type": "event", "event": "time_left", "data": { "event_id": 1, "time_left": 93 } }
//! ```
//!
//! **Server → Client (Result / Error):**
//! ```json
//! { "type": "result", "message": "Reservation confirmed!", "outcome": { "outcome": "confirmed", ... } }
//! { "type": "error", "code": "HOLD_NOT_FOUND", "message": "No active hold for ana on event 1" }
//! ```

use crate::admission::ObserverGuard;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::StreamExt, SinkExt};
use reservations_core::{Notification, ReservationAction, ReservationError, ReservationOutcome};
use reservations_runtime::ReservationEngine;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Replies queued for one client before the receive side waits
const REPLY_BUFFER: usize = 32;

/// WebSocket message envelope for client-server communication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WsMessage {
    /// Command from client
    Command {
        /// The operation to run
        command: ReservationAction,
    },
    /// Notification pushed by the server
    Event(Notification),
    /// Successful reply to a command
    Result {
        /// Human-readable summary
        message: String,
        /// What the engine did
        outcome: ReservationOutcome,
    },
    /// Rejected command or unreadable frame
    Error {
        /// Machine-readable error code
        code: String,
        /// Error description
        message: String,
    },
    /// Ping message (keep-alive)
    Ping,
    /// Pong response
    Pong,
}

impl WsMessage {
    fn rejection(err: &ReservationError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    fn to_frame(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(Message::Text(json)),
            Err(e) => {
                error!(error = %e, "Failed to serialize WebSocket message");
                None
            }
        }
    }
}

/// `GET /ws`
///
/// Admits the observer if a slot is free and upgrades the connection.
///
/// # Errors
///
/// `503 SERVICE_UNAVAILABLE` when the maximum number of observers is
/// already connected.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn handle(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let Some(guard) = state.observers.try_admit() else {
        warn!(
            max_online = state.observers.max_online(),
            "Refusing observer: too many users online"
        );
        return Err(AppError::unavailable("Too many users online"));
    };

    info!(online = state.observers.online(), "WebSocket connection admitted");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, guard)))
}

/// Run one admitted connection until either side closes.
///
/// The events snapshot is written before the online count is announced,
/// so it is always the first frame. Then spawns two concurrent tasks:
/// 1. **Sender**: streams notifications and command replies to the client
/// 2. **Receiver**: parses incoming frames and runs commands on the engine
async fn handle_socket(socket: WebSocket, state: AppState, guard: ObserverGuard) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before announcing so the observer sees its own arrival
    let mut notifications = state.notifications.subscribe();

    let snapshot = WsMessage::Event(Notification::EventsUpdated {
        events: state.engine.list_all().await,
    });
    if let Some(frame) = snapshot.to_frame() {
        if sender.send(frame).await.is_err() {
            debug!("Observer left before the snapshot was delivered");
            return;
        }
    }
    guard.announce();

    let (reply_tx, mut reply_rx) = mpsc::channel::<WsMessage>(REPLY_BUFFER);

    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                biased;

                reply = reply_rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
                received = notifications.recv() => match received {
                    Ok(notification) => WsMessage::Event(notification),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Observer lagged behind, notifications dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let Some(frame) = message.to_frame() else {
                continue;
            };
            if sender.send(frame).await.is_err() {
                // Client disconnected
                break;
            }
        }

        debug!("WebSocket send task terminated");
    });

    let engine = state.engine.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let reply = match msg {
                Message::Text(text) => handle_text(&engine, &text).await,
                Message::Binary(_) => {
                    warn!("Received unexpected binary message");
                    None
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Axum answers protocol pings itself
                    None
                }
                Message::Close(_) => {
                    info!("Client requested close");
                    break;
                }
            };

            if let Some(reply) = reply {
                if reply_tx.send(reply).await.is_err() {
                    break;
                }
            }
        }

        debug!("WebSocket receive task terminated");
    });

    // Wait for either task to complete (connection closed)
    tokio::select! {
        _ = (&mut send_task) => {
            debug!("Send task completed, aborting receive task");
            recv_task.abort();
        },
        _ = (&mut recv_task) => {
            debug!("Receive task completed, aborting send task");
            send_task.abort();
        },
    }

    drop(guard);
    info!("WebSocket connection closed");
}

/// Answer one text frame; `None` when no reply is due
async fn handle_text(engine: &ReservationEngine, text: &str) -> Option<WsMessage> {
    match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::Command { command }) => Some(execute(engine, command).await),
        Ok(WsMessage::Ping) => Some(WsMessage::Pong),
        Ok(other) => {
            warn!(?other, "Unexpected message type from client");
            None
        }
        Err(e) => {
            debug!(error = %e, "Failed to parse WebSocket message");
            Some(WsMessage::Error {
                code: "INVALID_MESSAGE".to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// Run a client command against the engine.
///
/// Sweeps are scheduled by the server and refused here.
pub async fn execute(engine: &ReservationEngine, command: ReservationAction) -> WsMessage {
    if matches!(command, ReservationAction::Sweep) {
        return WsMessage::rejection(&ReservationError::InvalidRequest(
            "sweeps cannot be requested by clients".to_string(),
        ));
    }

    match engine.send(command).await {
        Ok(outcome) => WsMessage::Result {
            message: outcome.message(),
            outcome,
        },
        Err(err) => WsMessage::rejection(&err),
    }
}
