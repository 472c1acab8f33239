use huddle_core::{RoomId, SignalMessage};

use crate::integration::TestRelay;
use crate::utils::{join, kick, user_disconnected};

#[test]
fn test_non_host_kick_disconnects_nobody() {
    let relay = TestRelay::new();

    let mut a = relay.connect();
    let mut b = relay.connect();
    let mut c = relay.connect();
    for peer in [&mut a, &mut b, &mut c] {
        join(peer, "r1", None, None);
    }
    relay.output.clear();

    b.handle(kick(c.connection_id()));
    b.handle(kick(a.connection_id()));

    assert!(relay.output.disconnected().is_empty());
    assert!(relay.output.messages_for(&a.connection_id()).is_empty());
    assert!(relay.output.messages_for(&c.connection_id()).is_empty());
    assert_eq!(
        relay.output.take_for(&b.connection_id()),
        vec![
            SignalMessage::ErrorMessage("Only the host can remove participants".into()),
            SignalMessage::ErrorMessage("Only the host can remove participants".into()),
        ]
    );
}

#[test]
fn test_host_kick_evicts_target() {
    let relay = TestRelay::new();
    let room = RoomId::from("r1");

    let mut a = relay.connect();
    let mut b = relay.connect();
    let mut c = relay.connect();
    join(&mut a, "r1", None, None);
    join(&mut b, "r1", None, None);
    join(&mut c, "r1", Some("carol"), None);
    relay.output.clear();

    let c_id = c.connection_id();
    a.handle(kick(c_id));

    assert_eq!(relay.output.take_for(&c_id), vec![SignalMessage::Kicked]);
    assert_eq!(relay.output.disconnected(), vec![c_id]);

    // The transport closes the socket, which ends the handler.
    c.close();

    for peer in [&a, &b] {
        assert_eq!(
            relay.output.take_for(&peer.connection_id()),
            vec![
                user_disconnected(c_id, Some("carol")),
                SignalMessage::UpdateViewerCount(2),
            ]
        );
    }
    assert!(!relay.registry.is_member(&room, &c_id));
}

#[test]
fn test_kick_outside_room_is_dropped() {
    let relay = TestRelay::new();

    let mut a = relay.connect();
    let mut stranger = relay.connect();
    join(&mut a, "r1", None, None);
    join(&mut stranger, "r2", None, None);
    relay.output.clear();

    a.handle(kick(stranger.connection_id()));
    a.handle(kick(a.connection_id()));

    assert!(relay.output.disconnected().is_empty());
    assert_eq!(relay.output.total_sent(), 0);
}
