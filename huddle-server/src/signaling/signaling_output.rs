use huddle_core::{ConnectionId, SignalMessage};

/// Trait the transport implements so the relay can reach clients.
///
/// Both methods only enqueue and must never block; the relay calls them while
/// a room is locked.
pub trait SignalingOutput: Send + Sync {
    /// Queue a message for a single connection.
    fn send(&self, connection_id: &ConnectionId, message: SignalMessage);

    /// Queue a forced close for a connection, after anything already sent to it.
    fn disconnect(&self, connection_id: &ConnectionId);
}
