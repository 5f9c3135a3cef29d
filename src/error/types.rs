//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Client registry errors
#[derive(Debug)]
pub enum RegistryError {
    /// The registry is at capacity. A defined rejection outcome, not a
    /// server fault: the caller closes the new connection and carries on.
    Full { capacity: usize },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full { capacity } => {
                write!(f, "client registry full (capacity {})", capacity)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Server startup errors, all fatal to the process
#[derive(Debug)]
pub enum ServerError {
    InvalidConfig(String),
    InvalidAddress(String),
    Socket(io::Error),
    Bind(SocketAddr, io::Error),
    Listen(SocketAddr, io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            ServerError::InvalidAddress(addr) => write!(f, "Invalid bind address: {}", addr),
            ServerError::Socket(e) => write!(f, "Failed to create socket: {}", e),
            ServerError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ServerError::Listen(addr, e) => write!(f, "Failed to listen on {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ServerError {}
