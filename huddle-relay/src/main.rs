use anyhow::{Context, Result};
use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_server::{
    AppState, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_PORT, DEFAULT_STUN_SERVERS, RelayConfig, router,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signaling relay for browser video rooms.
#[derive(Parser, Debug)]
#[command(name = "huddle-relay", version)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "RELAY_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// STUN/TURN urls advertised to clients.
    #[arg(
        long = "ice-server",
        env = "ICE_SERVERS",
        value_delimiter = ',',
        default_values_t = default_ice_servers()
    )]
    ice_servers: Vec<String>,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", requires = "turn_url")]
    turn_credential: Option<String>,

    /// Largest accepted WebSocket message, in bytes.
    #[arg(long, env = "MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,
}

fn default_ice_servers() -> Vec<String> {
    DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect()
}

impl Cli {
    fn into_config(self) -> RelayConfig {
        let mut ice_servers = Vec::new();

        if !self.ice_servers.is_empty() {
            ice_servers.push(IceServerConfig {
                urls: self.ice_servers,
                username: None,
                credential: None,
            });
        }

        if let Some(turn_url) = self.turn_url {
            ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: self.turn_username,
                credential: self.turn_credential,
            });
        }

        RelayConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            ice_servers,
            max_message_size: self.max_message_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    let addr = config.bind_addr;

    info!(
        "Initializing relay ({} ICE server entries, max message {} bytes)",
        config.ice_servers.len(),
        config.max_message_size
    );

    let state = Arc::new(AppState::new(config));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Signaling relay listening on ws://{}/ws", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
