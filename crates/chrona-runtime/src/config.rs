//! Actor configuration

use std::net::SocketAddr;
use std::time::Duration;

use chrona_transport::DEFAULT_PORT;

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Where the server listens.
    pub server_addr: SocketAddr,
    /// How often to request the time of day.
    pub request_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            request_interval: Duration::from_secs(1),
        }
    }
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on. Port 0 lets the OS pick one.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_the_well_known_port() {
        assert_eq!(ClientConfig::default().server_addr.port(), DEFAULT_PORT);
        assert_eq!(ServerConfig::default().bind_addr.port(), DEFAULT_PORT);
        assert_eq!(ClientConfig::default().request_interval, Duration::from_secs(1));
    }
}
