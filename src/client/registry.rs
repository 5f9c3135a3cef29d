//! Client registry
//!
//! Tracks every connected client in a bounded map behind a single lock and
//! carries the broadcast engine. The lock is held only while the map is
//! scanned or mutated, never across a socket operation: broadcast copies
//! the writers it needs out of the registry first and sends after the lock
//! is released.

use std::collections::HashMap;
use std::net::SocketAddr;

use log::info;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::client::state::{Client, SharedWriter};
use crate::error::RegistryError;

/// Bounded registry of the currently connected clients, keyed by peer
/// address. Owned by the server instance and shared with every session.
pub struct ClientRegistry {
    clients: Mutex<HashMap<SocketAddr, Client>>,
    capacity: usize,
}

impl ClientRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Maximum number of concurrently connected clients.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently connected clients.
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Admits a new client if a slot is free.
    ///
    /// On [`RegistryError::Full`] no record is created and the caller is
    /// responsible for closing the connection.
    pub async fn try_admit(
        &self,
        addr: SocketAddr,
        writer: SharedWriter,
    ) -> Result<(), RegistryError> {
        let mut clients = self.clients.lock().await;
        if clients.len() >= self.capacity {
            return Err(RegistryError::Full {
                capacity: self.capacity,
            });
        }
        clients.insert(addr, Client::new(addr, writer));
        Ok(())
    }

    /// Records the display name negotiated during the handshake.
    pub async fn set_display_name(&self, addr: SocketAddr, name: &str) {
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get_mut(&addr) {
            client.set_display_name(name.to_string());
        }
    }

    /// Returns the display name of a connected client, if present.
    pub async fn display_name(&self, addr: SocketAddr) -> Option<String> {
        let clients = self.clients.lock().await;
        clients.get(&addr).map(|c| c.display_name().to_string())
    }

    /// Removes a client and shuts its stream down.
    ///
    /// Safe to call more than once for the same address: concurrent cleanup
    /// paths (session teardown, server drain) may both reach here, and the
    /// second call finds nothing to do.
    pub async fn remove(&self, addr: SocketAddr) {
        let removed = self.clients.lock().await.remove(&addr);
        if let Some(client) = removed {
            info!("Removing client {} ({})", client.display_name(), addr);
            let writer = client.writer();
            let _ = writer.lock().await.shutdown().await;
        }
    }

    /// Copies the writers of every client except `exclude`.
    ///
    /// The copy is taken under the registry lock and iterated without it,
    /// so later admissions and removals do not affect a delivery already in
    /// progress.
    pub async fn snapshot_except(&self, exclude: SocketAddr) -> Vec<SharedWriter> {
        let clients = self.clients.lock().await;
        clients
            .values()
            .filter(|client| client.addr() != exclude)
            .map(|client| client.writer())
            .collect()
    }

    /// Best-effort delivery of `message` to every client except `exclude`.
    ///
    /// A failed send to one recipient must not stop delivery to the rest,
    /// so per-recipient errors are discarded; a broken peer gets cleaned up
    /// by its own session when its next read fails.
    pub async fn broadcast(&self, message: &str, exclude: SocketAddr) {
        let targets = self.snapshot_except(exclude).await;
        for writer in targets {
            let mut writer = writer.lock().await;
            let _ = writer.write_all(message.as_bytes()).await;
        }
    }

    /// Empties the registry during server shutdown, closing every stream.
    ///
    /// The lock is taken once to swap the whole map out; the streams are
    /// shut down after it is released.
    pub async fn drain(&self) {
        let drained = std::mem::take(&mut *self.clients.lock().await);
        for (addr, client) in drained {
            info!("Disconnecting {} ({})", client.display_name(), addr);
            let writer = client.writer();
            let _ = writer.lock().await.shutdown().await;
        }
    }
}
