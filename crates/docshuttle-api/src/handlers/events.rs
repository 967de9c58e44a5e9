use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use docshuttle_services::NotificationHub;
use std::sync::Arc;

use crate::state::AppState;

/// Upgrade to a WebSocket that streams lifecycle events.
///
/// Each event is sent as a text frame containing the event kind. There is no
/// backlog: the client only sees events raised while connected.
pub async fn events(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(mut socket: WebSocket, hub: NotificationHub) {
    let (conn_id, mut rx) = hub.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        if socket
                            .send(Message::Text(event.as_str().into()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    // Hub dropped the sender; nothing more to forward.
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Inbound frames are ignored; the stream is one-way.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    hub.unsubscribe(conn_id);
    tracing::debug!(conn_id = %conn_id, "Event stream closed");
}
