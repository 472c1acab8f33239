use huddle_core::IceServerConfig;
use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

pub const DEFAULT_STUN_SERVERS: &[&str] = &[
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    /// Advertised to clients on connect. The relay never contacts them.
    pub ice_servers: Vec<IceServerConfig>,
    /// Largest inbound WebSocket message, in bytes.
    pub max_message_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            ice_servers: vec![IceServerConfig {
                urls: DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect(),
                username: None,
                credential: None,
            }],
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
