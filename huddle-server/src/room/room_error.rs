use huddle_core::{ConnectionId, RoomId};
use thiserror::Error;

/// Rejections a client is told about. The display text is sent verbatim in `error-message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Only the host can remove participants")]
    NotHost,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("connection {connection_id} is not a member of room '{room_id}'")]
    NotMember {
        room_id: RoomId,
        connection_id: ConnectionId,
    },

    #[error("the host cannot evict itself")]
    SelfEviction,
}
