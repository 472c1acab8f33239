use huddle_core::{ConnectionId, SignalMessage};
use huddle_server::SignalingOutput;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Captured {
    sent: Vec<(ConnectionId, SignalMessage)>,
    disconnected: Vec<ConnectionId>,
}

/// Mock SignalingOutput that captures every outgoing message and forced close.
#[derive(Clone, Default)]
pub struct MockSignalingOutput {
    captured: Arc<Mutex<Captured>>,
}

impl MockSignalingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages queued for `connection_id`, oldest first, without consuming them.
    pub fn messages_for(&self, connection_id: &ConnectionId) -> Vec<SignalMessage> {
        self.captured
            .lock()
            .unwrap()
            .sent
            .iter()
            .filter(|(to, _)| to == connection_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Messages queued for `connection_id`, removing them from the capture.
    pub fn take_for(&self, connection_id: &ConnectionId) -> Vec<SignalMessage> {
        let mut captured = self.captured.lock().unwrap();
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut captured.sent)
            .into_iter()
            .partition(|(to, _)| to == connection_id);
        captured.sent = kept;
        taken.into_iter().map(|(_, msg)| msg).collect()
    }

    pub fn total_sent(&self) -> usize {
        self.captured.lock().unwrap().sent.len()
    }

    pub fn disconnected(&self) -> Vec<ConnectionId> {
        self.captured.lock().unwrap().disconnected.clone()
    }

    pub fn clear(&self) {
        let mut captured = self.captured.lock().unwrap();
        captured.sent.clear();
        captured.disconnected.clear();
    }
}

impl SignalingOutput for MockSignalingOutput {
    fn send(&self, connection_id: &ConnectionId, message: SignalMessage) {
        tracing::debug!(
            "[MockSignaling] {} -> {:?}",
            message.event_name(),
            connection_id
        );
        self.captured
            .lock()
            .unwrap()
            .sent
            .push((*connection_id, message));
    }

    fn disconnect(&self, connection_id: &ConnectionId) {
        tracing::debug!("[MockSignaling] disconnect {:?}", connection_id);
        self.captured
            .lock()
            .unwrap()
            .disconnected
            .push(*connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_signaling_separates_recipients() {
        let signaling = MockSignalingOutput::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        signaling.send(&a, SignalMessage::YouAreHost);
        signaling.send(&b, SignalMessage::UpdateViewerCount(2));
        signaling.send(&a, SignalMessage::UpdateViewerCount(2));

        assert_eq!(
            signaling.take_for(&a),
            vec![SignalMessage::YouAreHost, SignalMessage::UpdateViewerCount(2)]
        );
        assert!(signaling.messages_for(&a).is_empty());
        assert_eq!(signaling.messages_for(&b).len(), 1);
    }

    #[test]
    fn test_mock_signaling_captures_disconnect() {
        let signaling = MockSignalingOutput::new();
        let a = ConnectionId::new();

        signaling.disconnect(&a);

        assert_eq!(signaling.disconnected(), vec![a]);
        assert_eq!(signaling.total_sent(), 0);
    }
}
