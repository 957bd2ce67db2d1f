use tandem_core::IceServerConfig;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the signaling endpoint, e.g. `ws://localhost:8080/ws`.
    pub signaling_url: String,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(signaling_url: impl Into<String>) -> Self {
        Self {
            signaling_url: signaling_url.into(),
            ice_servers: IceServerConfig::defaults(),
        }
    }
}
