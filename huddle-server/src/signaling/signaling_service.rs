use crate::signaling::SignalingOutput;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes};
use dashmap::DashMap;
use huddle_core::{ConnectionId, IceServerConfig, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Close code sent to a connection removed by its room host.
pub const KICKED_CLOSE_CODE: u16 = 4001;

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Outboxes of every live WebSocket, keyed by connection id.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.inner.ice_servers
    }

    pub fn add_connection(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(connection_id, tx);
    }

    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    fn push(&self, connection_id: &ConnectionId, msg: Message) {
        let Some(outbox) = self.inner.connections.get(connection_id) else {
            warn!(
                "Attempted to send to disconnected connection {}",
                connection_id
            );
            return;
        };

        if outbox.send(msg).is_err() {
            error!("Outbox of {} is closed", connection_id);
        }
    }
}

impl SignalingOutput for SignalingService {
    fn send(&self, connection_id: &ConnectionId, message: SignalMessage) {
        match serde_json::to_string(&message) {
            Ok(json) => self.push(connection_id, Message::Text(json.into())),
            Err(e) => error!(
                "Failed to serialize {} message: {}",
                message.event_name(),
                e
            ),
        }
    }

    fn disconnect(&self, connection_id: &ConnectionId) {
        let frame = CloseFrame {
            code: KICKED_CLOSE_CODE,
            reason: Utf8Bytes::from_static("kicked"),
        };
        self.push(connection_id, Message::Close(Some(frame)));
    }
}
