use crate::room::{AuthError, Member, Room, RoomError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huddle_core::{ConnectionId, RoomId};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinResult {
    pub is_host: bool,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveResult {
    pub member: Member,
    /// Zero means the room was removed from the registry.
    pub member_count: usize,
    pub new_host: Option<ConnectionId>,
}

/// Instruction to force a member off the relay. The registry itself never
/// touches connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub room_id: RoomId,
    pub target: Member,
}

/// Every room with at least one member, keyed by id.
///
/// Mutations hold the room's map entry for their whole duration, so joins,
/// leaves and host changes on one room are applied one at a time. The `_with`
/// variants run an observer before the entry is released; anything it
/// enqueues is ordered exactly like the mutations themselves.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(
        &self,
        room_id: &RoomId,
        member: Member,
        password: Option<&str>,
    ) -> Result<JoinResult, AuthError> {
        self.join_with(room_id, member, password, |_, _| ())
    }

    pub fn join_with<F>(
        &self,
        room_id: &RoomId,
        member: Member,
        password: Option<&str>,
        observe: F,
    ) -> Result<JoinResult, AuthError>
    where
        F: FnOnce(&JoinResult, &Room),
    {
        let connection_id = member.connection_id;

        match self.rooms.entry(room_id.clone()) {
            Entry::Vacant(slot) => {
                let mut room = Room::new(room_id.clone(), password.map(str::to_owned));
                room.add(member);
                room.set_host(connection_id);

                info!(
                    "Creating room '{}' (password: {})",
                    room_id,
                    room.has_password()
                );

                let room = slot.insert(room);
                let result = JoinResult {
                    is_host: true,
                    member_count: room.len(),
                };
                observe(&result, room.value());
                Ok(result)
            }

            Entry::Occupied(mut slot) => {
                let room = slot.get_mut();
                if !room.admits(password) {
                    return Err(AuthError::IncorrectPassword);
                }

                room.add(member);
                if room.host().is_none() {
                    room.set_host(connection_id);
                }

                let result = JoinResult {
                    is_host: room.host() == Some(connection_id),
                    member_count: room.len(),
                };
                observe(&result, room);
                Ok(result)
            }
        }
    }

    /// `None` when the room or the member is already gone.
    pub fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<LeaveResult> {
        self.leave_with(room_id, connection_id, |_, _| ())
    }

    pub fn leave_with<F>(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        observe: F,
    ) -> Option<LeaveResult>
    where
        F: FnOnce(&LeaveResult, &Room),
    {
        let Entry::Occupied(mut slot) = self.rooms.entry(room_id.clone()) else {
            return None;
        };

        let room = slot.get_mut();
        let was_host = room.host().as_ref() == Some(connection_id);
        let member = room.remove(connection_id)?;
        let new_host = if was_host {
            room.promote_successor()
        } else {
            None
        };

        let result = LeaveResult {
            member,
            member_count: room.len(),
            new_host,
        };
        observe(&result, room);

        if room.is_empty() {
            slot.remove();
            info!("Room '{}' is empty, removed", room_id);
        }

        Some(result)
    }

    pub fn kick(
        &self,
        room_id: &RoomId,
        requester: &ConnectionId,
        target: &ConnectionId,
    ) -> Result<Eviction, RoomError> {
        let Some(room) = self.rooms.get(room_id) else {
            return Err(AuthError::NotHost.into());
        };

        if room.host().as_ref() != Some(requester) {
            return Err(AuthError::NotHost.into());
        }
        if requester == target {
            return Err(RoomError::SelfEviction);
        }

        let target = room
            .member(target)
            .cloned()
            .ok_or_else(|| RoomError::NotMember {
                room_id: room_id.clone(),
                connection_id: *target,
            })?;

        Ok(Eviction {
            room_id: room_id.clone(),
            target,
        })
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.len())
    }

    pub fn is_host(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.host(room_id).as_ref() == Some(connection_id)
    }

    pub fn host(&self, room_id: &RoomId) -> Option<ConnectionId> {
        self.rooms.get(room_id).and_then(|room| room.host())
    }

    pub fn is_member(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains(connection_id))
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<Member> {
        self.rooms
            .get(room_id)
            .map(|room| room.members().to_vec())
            .unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
