use huddle_core::{RoomId, SignalMessage};
use huddle_server::ConnectionState;

use crate::integration::TestRelay;
use crate::utils::{join, user_connected, user_disconnected};

#[test]
fn test_first_joiner_is_host() {
    let relay = TestRelay::new();
    let room = RoomId::from("lobby");

    let mut peers: Vec<_> = (0..5).map(|_| relay.connect()).collect();
    for peer in peers.iter_mut() {
        join(peer, "lobby", None, None);
    }

    let host_notices: Vec<_> = peers
        .iter()
        .map(|p| {
            relay
                .output
                .messages_for(&p.connection_id())
                .iter()
                .filter(|m| **m == SignalMessage::YouAreHost)
                .count()
        })
        .collect();

    assert_eq!(host_notices, vec![1, 0, 0, 0, 0]);
    assert!(relay.registry.is_host(&room, &peers[0].connection_id()));
    assert_eq!(relay.registry.member_count(&room), 5);
}

#[test]
fn test_two_party_room_lifecycle() {
    let relay = TestRelay::new();
    let room = RoomId::from("r1");

    let mut a = relay.connect();
    let mut b = relay.connect();
    let (a_id, b_id) = (a.connection_id(), b.connection_id());

    join(&mut a, "r1", Some("alice"), None);
    assert!(relay.registry.is_host(&room, &a_id));
    assert_eq!(
        relay.output.take_for(&a_id),
        vec![SignalMessage::YouAreHost, SignalMessage::UpdateViewerCount(1)]
    );
    assert_eq!(
        a.state(),
        &ConnectionState::Joined {
            room_id: room.clone(),
            nickname: Some("alice".into()),
        }
    );

    join(&mut b, "r1", Some("bob"), None);
    assert_eq!(relay.registry.member_count(&room), 2);
    assert_eq!(
        relay.output.take_for(&b_id),
        vec![SignalMessage::UpdateViewerCount(2)]
    );
    assert_eq!(
        relay.output.take_for(&a_id),
        vec![
            user_connected(b_id, Some("bob")),
            SignalMessage::UpdateViewerCount(2),
        ]
    );

    b.close();
    assert_eq!(
        relay.output.take_for(&a_id),
        vec![
            user_disconnected(b_id, Some("bob")),
            SignalMessage::UpdateViewerCount(1),
        ]
    );
    assert_eq!(relay.registry.member_count(&room), 1);
    assert!(relay.registry.is_host(&room, &a_id));

    a.close();
    assert!(!relay.registry.contains(&room));
    assert_eq!(relay.registry.room_count(), 0);
}

#[test]
fn test_anonymous_join() {
    let relay = TestRelay::new();

    let mut a = relay.connect();
    let mut b = relay.connect();
    join(&mut a, "quiet", None, None);
    join(&mut b, "quiet", Some(""), None);

    let to_a = relay.output.take_for(&a.connection_id());
    assert!(to_a.contains(&user_connected(b.connection_id(), None)));
}
