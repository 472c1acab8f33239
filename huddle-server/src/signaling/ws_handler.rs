use crate::{AppState, ConnectionHandler, SignalingOutput};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ConnectionId, SignalMessage, Welcome};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::new();

    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, connection_id, state))
}

async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, state: Arc<AppState>) {
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let signaling = state.signaling.clone();
    signaling.add_connection(connection_id, tx);
    signaling.send(
        &connection_id,
        SignalMessage::Welcome(Welcome {
            connection_id,
            ice_servers: signaling.ice_servers().to_vec(),
        }),
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut handler = ConnectionHandler::new(
        connection_id,
        state.registry.clone(),
        Arc::new(signaling.clone()),
    );

    loop {
        tokio::select! {
            _ = &mut send_task => break,

            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<SignalMessage>(text.as_str()) {
                        Ok(signal) => handler.handle(signal),
                        Err(e) => warn!("Invalid SignalMessage from {}: {}", connection_id, e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
            },
        }
    }

    send_task.abort();
    handler.close();
    signaling.remove_connection(&connection_id);

    info!("WebSocket disconnected: {}", connection_id);
}
