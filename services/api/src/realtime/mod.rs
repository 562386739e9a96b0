//! Realtime gateway
//!
//! A single WebSocket endpoint authenticated by the same session cookie as
//! the HTTP API. Connecting marks the user online, disconnecting marks
//! them offline, and both transitions are broadcast to every connected
//! client along with chat messages and social notifications.

pub mod dispatcher;
pub mod events;

pub use dispatcher::Dispatcher;
pub use events::{ClientCommand, ServerEvent};

use axum::{
    Extension,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::jwt::Claims;
use crate::state::AppState;

/// WebSocket upgrade handler. Runs behind the auth middleware, so the
/// session claims are already validated.
pub async fn ws_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, claims, socket))
}

async fn handle_socket(state: AppState, claims: Claims, socket: WebSocket) {
    info!("Realtime session opened for {}", claims.username);

    let (mut sink, mut stream) = socket.split();
    let mut events = state.dispatcher.subscribe();

    set_presence(&state, &claims, true).await;

    let ready = ServerEvent::ServerReady {
        message: "connected and acknowledged".to_string(),
    };
    if send_event(&mut sink, &ready).await.is_err() {
        set_presence(&state, &claims, false).await;
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Realtime session for {} lagged, skipped {} events",
                        claims.username, skipped
                    );
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    handle_command(&state, &claims, &text).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Realtime session error for {}: {}", claims.username, e);
                    break;
                }
            },
        }
    }

    set_presence(&state, &claims, false).await;
    info!("Realtime session closed for {}", claims.username);
}

/// Flip the user's presence flag in the database and tell everyone.
async fn set_presence(state: &AppState, claims: &Claims, online: bool) {
    match state.user_repository.set_online(claims.sub, online).await {
        Ok(Some(user)) => {
            state.dispatcher.broadcast(ServerEvent::StatusUpdate {
                username: user.username,
                is_online: online,
            });
        }
        Ok(None) => {
            warn!("Presence toggle for missing user {}", claims.sub);
        }
        Err(e) => {
            error!("Failed to toggle presence for {}: {}", claims.username, e);
        }
    }
}

async fn handle_command(state: &AppState, claims: &Claims, text: &str) {
    match serde_json::from_str::<ClientCommand>(text) {
        Ok(ClientCommand::Message { message }) => {
            if message.trim().is_empty() {
                return;
            }

            match state.community_repository.append(claims.sub, &message).await {
                Ok(saved) => {
                    state.dispatcher.broadcast(ServerEvent::MessageResponse {
                        id: saved.id,
                        username: claims.username.clone(),
                        content: saved.content,
                        timestamp: saved.created_at,
                    });
                }
                Err(e) => {
                    error!("Failed to store message from {}: {}", claims.username, e);
                }
            }
        }
        Ok(ClientCommand::GoOnline) => set_presence(state, claims, true).await,
        Ok(ClientCommand::GoOffline) => set_presence(state, claims, false).await,
        Err(e) => {
            warn!(
                "Unrecognized realtime command from {}: {}",
                claims.username, e
            );
        }
    }
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(payload) => sink.send(Message::Text(payload)).await,
        Err(e) => {
            error!("Failed to serialize realtime event: {}", e);
            Ok(())
        }
    }
}
