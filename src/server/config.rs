//! Server configuration
//!
//! Holds the fixed server settings and their validation. There is no
//! configuration file and no environment override: the signal interface
//! aside, the server exposes no external control surface.

use crate::error::ServerError;

/// Server configuration structure
pub struct ServerConfig {
    /// Interface to bind; all interfaces by default.
    pub host: String,
    /// TCP port for the chat service.
    pub port: u16,
    /// Hard cap on concurrently connected clients.
    pub max_clients: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_clients: 10,
        }
    }
}

impl ServerConfig {
    /// Bind address in `host:port` form.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejects configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.max_clients == 0 {
            return Err(ServerError::InvalidConfig(
                "max_clients must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
