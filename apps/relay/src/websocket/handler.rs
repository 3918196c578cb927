//! WebSocket upgrade handler and socket lifecycle
//!
//! Every connection is admitted; identity is optional at connect time
//! and only checked when a privileged message arrives. The socket is
//! split into a send task fed by the registry channel and a receive
//! loop that dispatches decoded frames.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Query,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use super::connection::ConnectionRegistry;
use super::dispatch::{CommandDispatcher, Disposition};
use super::messages::{ClientMessage, ServerMessage};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    /// Optional identity token, resolved per-action, never at connect
    token: Option<String>,
}

/// WebSocket upgrade handler
///
/// Never rejects an upgrade: anonymous listeners are first-class
/// citizens who can watch state and search. The token, if any, is
/// stored alongside the connection for later authority checks.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQueryParams>,
    Extension(registry): Extension<ConnectionRegistry>,
    Extension(dispatcher): Extension<CommandDispatcher>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, params.token, registry, dispatcher))
}

/// Handle an established WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    token: Option<String>,
    registry: ConnectionRegistry,
    dispatcher: CommandDispatcher,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = registry.register(tx, token);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Forward registry messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        tracing::debug!(connection_id = %connection_id, "WebSocket send failed");
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize outbound message");
                }
            }
        }
    });

    // Decode and dispatch inbound frames
    let recv_registry = registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => {
                        if dispatcher.dispatch(connection_id, msg).await == Disposition::Disconnect
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        // Undecodable frames are dropped, not fatal
                        tracing::debug!(
                            error = %e,
                            connection_id = %connection_id,
                            "Ignoring undecodable client message"
                        );
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Ignoring unsupported binary message"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Keepalive frames are handled by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "WebSocket close received");
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        connection_id = %connection_id,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
        recv_registry.deregister(connection_id);
    });

    // Whichever side finishes first tears down the other
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    // Idempotent: the receive loop usually got here first
    registry.deregister(connection_id);

    tracing::info!(connection_id = %connection_id, "WebSocket connection closed");
}
