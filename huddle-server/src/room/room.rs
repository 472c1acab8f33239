use huddle_core::{ConnectionId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub nickname: Option<String>,
}

impl Member {
    /// Empty nicknames are stored as anonymous.
    pub fn new(connection_id: ConnectionId, nickname: Option<String>) -> Self {
        Self {
            connection_id,
            nickname: nickname.filter(|n| !n.is_empty()),
        }
    }
}

/// State of a single room. Members are kept in join order, which is also the
/// order in which hosts are picked when the current host leaves.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    password: Option<String>,
    host: Option<ConnectionId>,
    members: Vec<Member>,
}

impl Room {
    pub(crate) fn new(id: RoomId, password: Option<String>) -> Self {
        Self {
            id,
            password: password.filter(|p| !p.is_empty()),
            host: None,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn host(&self) -> Option<ConnectionId> {
        self.host
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| &m.connection_id == connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.member(connection_id).is_some()
    }

    /// Everyone in the room except `connection_id`.
    pub fn others<'a>(
        &'a self,
        connection_id: &'a ConnectionId,
    ) -> impl Iterator<Item = &'a ConnectionId> + 'a {
        self.members
            .iter()
            .map(|m| &m.connection_id)
            .filter(move |id| *id != connection_id)
    }

    pub(crate) fn admits(&self, password: Option<&str>) -> bool {
        match &self.password {
            Some(expected) => password == Some(expected.as_str()),
            None => true,
        }
    }

    /// Returns false if the connection was already a member.
    pub(crate) fn add(&mut self, member: Member) -> bool {
        if self.contains(&member.connection_id) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub(crate) fn remove(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let pos = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection_id)?;
        let member = self.members.remove(pos);

        if self.host.as_ref() == Some(connection_id) {
            self.host = None;
        }

        Some(member)
    }

    pub(crate) fn set_host(&mut self, connection_id: ConnectionId) {
        debug_assert!(self.contains(&connection_id));
        self.host = Some(connection_id);
    }

    /// Hands the host role to the longest-standing member, if there is one.
    pub(crate) fn promote_successor(&mut self) -> Option<ConnectionId> {
        let next = self.members.first()?.connection_id;
        self.host = Some(next);
        Some(next)
    }
}
