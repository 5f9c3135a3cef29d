//! Vox Chat Server - Entry Point
//!
//! Binds the listening socket, wires the interrupt signal to the shutdown
//! channel, and runs the server until it drains.

use log::{error, info};
use tokio::signal;

use vox_chat_server::logging;
use vox_chat_server::server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    logging::init();

    info!("Launching chat server...");

    let config = ServerConfig::default();
    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown_tx = server.shutdown_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    server.start().await;
}
