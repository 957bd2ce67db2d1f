use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Parser)]
#[command(name = "tandem-server")]
#[command(about = "Pairs two participants per room and relays their WebRTC signaling")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "TANDEM_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, env = "TANDEM_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log filter in `tracing_subscriber::EnvFilter` syntax.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
