//! Module `core`
//!
//! The server instance: owns the listening socket, the client registry, and
//! the shutdown channel. `start` runs the accept loop until the shutdown
//! signal fires, then drains the registry.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{Mutex, broadcast};

use crate::client::handle_session;
use crate::client::registry::ClientRegistry;
use crate::client::state::SharedWriter;
use crate::error::ServerError;
use crate::server::config::ServerConfig;

pub struct Server {
    listener: TcpListener,
    registry: Arc<ClientRegistry>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Binds the listening socket described by `config`.
    ///
    /// Address reuse is enabled and the listen backlog matches the client
    /// capacity. Any failure here is fatal for the process; per-client
    /// errors later on are not.
    pub fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let addr: SocketAddr = config
            .socket_addr()
            .parse()
            .map_err(|_| ServerError::InvalidAddress(config.socket_addr()))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ServerError::Socket)?;
        socket.set_reuseaddr(true).map_err(ServerError::Socket)?;
        socket.bind(addr).map_err(|e| ServerError::Bind(addr, e))?;

        let listener = socket
            .listen(config.max_clients as u32)
            .map_err(|e| ServerError::Listen(addr, e))?;
        info!("Server bound to {}", addr);

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            listener,
            registry: Arc::new(ClientRegistry::new(config.max_clients)),
            shutdown_tx,
        })
    }

    /// Address the listener actually bound to. Differs from the configured
    /// one when the configuration asked for port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Sender half of the shutdown channel. One message ends the accept
    /// loop and wakes every session.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Runs the accept loop until the shutdown signal arrives, then drains
    /// the registry, closing every remaining client stream.
    pub async fn start(&self) {
        info!(
            "Starting chat server (max {} clients)",
            self.registry.capacity()
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.admit(stream, addr).await,
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, closing the accept loop");
                    break;
                }
            }
        }

        self.registry.drain().await;
        info!("All clients disconnected, server stopped");
    }

    /// Admits an accepted connection and spawns its session task, or closes
    /// it on the spot when the registry is full. The task is detached; the
    /// registry is the only supervision it gets.
    async fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        let (reader, writer) = stream.into_split();
        let writer: SharedWriter = Arc::new(Mutex::new(writer));

        match self.registry.try_admit(addr, Arc::clone(&writer)).await {
            Ok(()) => {
                info!(
                    "Connection from {} ({}/{} clients)",
                    addr,
                    self.registry.len().await,
                    self.registry.capacity()
                );
                let registry = Arc::clone(&self.registry);
                let shutdown_rx = self.shutdown_tx.subscribe();
                tokio::spawn(handle_session(reader, writer, addr, registry, shutdown_rx));
            }
            Err(e) => {
                // Nothing is written to the rejected peer; it only sees
                // its connection close.
                warn!("Rejecting {}: {}", addr, e);
                let _ = writer.lock().await.shutdown().await;
            }
        }
    }
}
