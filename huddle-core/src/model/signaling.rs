use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Every event that crosses the relay, in either direction.
///
/// On the wire each message is `{"op": "<event>", "d": <payload>}`; events
/// without a payload omit `"d"`. Room events (media state, chat, reactions,
/// sounds and game events) are application data the relay never interprets,
/// so their payloads stay raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    Welcome(Welcome),
    JoinRoom(JoinRoom),
    YouAreHost,
    ErrorMessage(String),
    UserConnected(MemberNotice),
    UserDisconnected(MemberNotice),
    UpdateViewerCount(usize),
    KickUser(KickUser),
    Kicked,
    Offer(Negotiation),
    Answer(Negotiation),
    Candidate(Negotiation),
    MediaStateChange(Value),
    ChatMessage(Value),
    Reaction(Value),
    PlaySound(Value),
    GameMove(Value),
    /// Sent as a bare room id, an object, or with no `"d"` at all.
    GameRestart(Option<Value>),
}

impl SignalMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Welcome(_) => "welcome",
            Self::JoinRoom(_) => "join-room",
            Self::YouAreHost => "you-are-host",
            Self::ErrorMessage(_) => "error-message",
            Self::UserConnected(_) => "user-connected",
            Self::UserDisconnected(_) => "user-disconnected",
            Self::UpdateViewerCount(_) => "update-viewer-count",
            Self::KickUser(_) => "kick-user",
            Self::Kicked => "kicked",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
            Self::MediaStateChange(_) => "media-state-change",
            Self::ChatMessage(_) => "chat-message",
            Self::Reaction(_) => "reaction",
            Self::PlaySound(_) => "play-sound",
            Self::GameMove(_) => "game-move",
            Self::GameRestart(_) => "game-restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub connection_id: ConnectionId,
    #[serde(default)]
    pub ice_servers: Vec<IceServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: RoomId,
    /// Ignored by the relay, which always uses the id it assigned at connect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<ConnectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberNotice {
    pub connection_id: ConnectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickUser {
    pub target: ConnectionId,
}

/// Offer, answer or candidate. Everything besides the routing fields is
/// carried untouched in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Negotiation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ConnectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<ConnectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}
