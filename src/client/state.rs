//! Module `state`
//!
//! Defines the `Client` record held by the registry for each live
//! connection: the peer address that identifies it, the display name
//! negotiated during handshake, and the shared write half of its stream.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Write half of a client connection.
///
/// Shared between the owning session (name prompt), the broadcast engine
/// (relayed messages and notices), and the registry (shutdown on removal).
/// The lock is held for the duration of a single send.
pub type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

/// State of one connected chat client.
///
/// The read half of the stream never lives here; it is owned exclusively by
/// the session handler task.
pub struct Client {
    addr: SocketAddr,
    display_name: String,
    writer: SharedWriter,
}

impl Client {
    /// Creates the record at admission time. The display name starts empty
    /// and is filled in once the handshake completes.
    pub fn new(addr: SocketAddr, writer: SharedWriter) -> Self {
        Self {
            addr,
            display_name: String::new(),
            writer,
        }
    }

    /// Returns the peer address, which doubles as the registry key.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the display name; empty until the handshake finishes.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Sets the display name negotiated during handshake.
    pub fn set_display_name(&mut self, name: String) {
        self.display_name = name;
    }

    /// Returns a handle to the shared write half.
    pub fn writer(&self) -> SharedWriter {
        Arc::clone(&self.writer)
    }
}
