use crate::room::{Member, Room, RoomError, RoomRegistry};
use crate::signaling::SignalingOutput;
use huddle_core::{ConnectionId, JoinRoom, MemberNotice, Negotiation, RoomId, SignalMessage};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where a single connection is in its lifetime. A connection joins at most one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Joined {
        room_id: RoomId,
        nickname: Option<String>,
    },
    Closed,
}

/// Reasons an inbound message was dropped.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("connection has not joined a room")]
    NotJoined,

    #[error("connection already belongs to room '{0}'")]
    AlreadyJoined(RoomId),

    #[error("target {0} is not in this room")]
    UnknownTarget(ConnectionId),

    #[error("clients may not send {0}")]
    UnexpectedMessage(&'static str),

    #[error("connection is closed")]
    Closed,
}

/// Per-connection protocol state machine and message router.
pub struct ConnectionHandler {
    connection_id: ConnectionId,
    state: ConnectionState,
    registry: Arc<RoomRegistry>,
    output: Arc<dyn SignalingOutput>,
}

impl ConnectionHandler {
    pub fn new(
        connection_id: ConnectionId,
        registry: Arc<RoomRegistry>,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            connection_id,
            state: ConnectionState::Connected,
            registry,
            output,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.state {
            ConnectionState::Joined { room_id, .. } => Some(room_id),
            _ => None,
        }
    }

    /// Processes one inbound message. Failures never propagate: auth failures
    /// are reported back to this connection, everything else is logged and dropped.
    pub fn handle(&mut self, message: SignalMessage) {
        let event = message.event_name();

        match self.dispatch(message) {
            Ok(()) => {}
            Err(RelayError::Room(RoomError::Auth(e))) => {
                debug!("Rejected {} from {}: {}", event, self.connection_id, e);
                self.output
                    .send(&self.connection_id, SignalMessage::ErrorMessage(e.to_string()));
            }
            Err(e) => warn!("Dropped {} from {}: {}", event, self.connection_id, e),
        }
    }

    fn dispatch(&mut self, message: SignalMessage) -> Result<(), RelayError> {
        match message {
            SignalMessage::JoinRoom(join) => self.join(join),

            SignalMessage::Offer(n) => self.relay_negotiation(n, SignalMessage::Offer),
            SignalMessage::Answer(n) => self.relay_negotiation(n, SignalMessage::Answer),
            SignalMessage::Candidate(n) => self.relay_negotiation(n, SignalMessage::Candidate),

            SignalMessage::KickUser(kick) => self.kick(&kick.target),

            msg @ (SignalMessage::MediaStateChange(_)
            | SignalMessage::ChatMessage(_)
            | SignalMessage::Reaction(_)
            | SignalMessage::PlaySound(_)
            | SignalMessage::GameMove(_)
            | SignalMessage::GameRestart(_)) => {
                let room_id = self.joined_room()?;
                self.broadcast(room_id, msg);
                Ok(())
            }

            msg @ (SignalMessage::Welcome(_)
            | SignalMessage::YouAreHost
            | SignalMessage::ErrorMessage(_)
            | SignalMessage::UserConnected(_)
            | SignalMessage::UserDisconnected(_)
            | SignalMessage::UpdateViewerCount(_)
            | SignalMessage::Kicked) => Err(RelayError::UnexpectedMessage(msg.event_name())),
        }
    }

    fn joined_room(&self) -> Result<&RoomId, RelayError> {
        match &self.state {
            ConnectionState::Joined { room_id, .. } => Ok(room_id),
            ConnectionState::Connected => Err(RelayError::NotJoined),
            ConnectionState::Closed => Err(RelayError::Closed),
        }
    }

    fn join(&mut self, join: JoinRoom) -> Result<(), RelayError> {
        match &self.state {
            ConnectionState::Connected => {}
            ConnectionState::Joined { room_id, .. } => {
                return Err(RelayError::AlreadyJoined(room_id.clone()));
            }
            ConnectionState::Closed => return Err(RelayError::Closed),
        }

        if let Some(claimed) = join.connection_id {
            if claimed != self.connection_id {
                debug!(
                    "Connection {} claimed id {}, using the assigned one",
                    self.connection_id, claimed
                );
            }
        }

        let me = self.connection_id;
        let member = Member::new(me, join.nickname);
        let nickname = member.nickname.clone();
        let output = &self.output;

        let joined = self
            .registry
            .join_with(&join.room_id, member, join.password.as_deref(), |result, room| {
                if result.is_host {
                    output.send(&me, SignalMessage::YouAreHost);
                }

                let notice = SignalMessage::UserConnected(MemberNotice {
                    connection_id: me,
                    nickname: nickname.clone(),
                });
                for other in room.others(&me) {
                    output.send(other, notice.clone());
                }

                send_viewer_count(&**output, room);
            })
            .map_err(RoomError::from)?;

        info!(
            "Connection {} ({}) joined room '{}' as {} ({} members)",
            me,
            nickname.as_deref().unwrap_or("anonymous"),
            join.room_id,
            if joined.is_host { "host" } else { "guest" },
            joined.member_count
        );

        self.state = ConnectionState::Joined {
            room_id: join.room_id,
            nickname,
        };
        Ok(())
    }

    /// Offers, answers and candidates. Targeted ones go to one member of the
    /// sender's room; untargeted ones go to every other member.
    fn relay_negotiation(
        &self,
        mut negotiation: Negotiation,
        wrap: fn(Negotiation) -> SignalMessage,
    ) -> Result<(), RelayError> {
        let room_id = self.joined_room()?;

        negotiation.caller_id = Some(self.connection_id);
        negotiation.room_id = Some(room_id.clone());

        match negotiation.target {
            Some(target) => {
                if target == self.connection_id || !self.registry.is_member(room_id, &target) {
                    return Err(RelayError::UnknownTarget(target));
                }
                let msg = wrap(negotiation);
                debug!("Relaying {} {} -> {}", msg.event_name(), self.connection_id, target);
                self.output.send(&target, msg);
            }
            None => self.broadcast(room_id, wrap(negotiation)),
        }

        Ok(())
    }

    fn kick(&self, target: &ConnectionId) -> Result<(), RelayError> {
        let room_id = self.joined_room()?;
        let eviction = self.registry.kick(room_id, &self.connection_id, target)?;

        info!(
            "Host {} removed {} from room '{}'",
            self.connection_id, eviction.target.connection_id, eviction.room_id
        );

        self.output
            .send(&eviction.target.connection_id, SignalMessage::Kicked);
        self.output.disconnect(&eviction.target.connection_id);
        Ok(())
    }

    /// Sends `message` to every current member of `room_id` except this connection.
    fn broadcast(&self, room_id: &RoomId, message: SignalMessage) {
        let recipients: Vec<_> = self
            .registry
            .members(room_id)
            .into_iter()
            .map(|m| m.connection_id)
            .filter(|id| *id != self.connection_id)
            .collect();

        debug!(
            "Broadcasting {} from {} to {} members of '{}'",
            message.event_name(),
            self.connection_id,
            recipients.len(),
            room_id
        );

        for id in &recipients {
            self.output.send(id, message.clone());
        }
    }

    /// Leaves the current room, if any. Safe to call more than once.
    pub fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
        let ConnectionState::Joined { room_id, nickname } = state else {
            return;
        };

        let me = self.connection_id;
        let output = &self.output;

        let left = self.registry.leave_with(&room_id, &me, |result, room| {
            let notice = SignalMessage::UserDisconnected(MemberNotice {
                connection_id: me,
                nickname,
            });
            for member in room.members() {
                output.send(&member.connection_id, notice.clone());
            }

            if let Some(host) = result.new_host {
                output.send(&host, SignalMessage::YouAreHost);
            }

            if !room.is_empty() {
                send_viewer_count(&**output, room);
            }
        });

        match left {
            Some(result) => info!(
                "Connection {} left room '{}' ({} members left{})",
                me,
                room_id,
                result.member_count,
                match result.new_host {
                    Some(_) => ", host reassigned",
                    None => "",
                }
            ),
            None => debug!("Connection {} was no longer in room '{}'", me, room_id),
        }
    }
}

impl Drop for ConnectionHandler {
    fn drop(&mut self) {
        self.close();
    }
}

fn send_viewer_count(output: &dyn SignalingOutput, room: &Room) {
    debug!("Room '{}' now has {} members", room.id(), room.len());
    let count = SignalMessage::UpdateViewerCount(room.len());
    for member in room.members() {
        output.send(&member.connection_id, count.clone());
    }
}
