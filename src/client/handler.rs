//! Module `handler`
//!
//! The per-connection session: handshake, receive loop, relay, and
//! deregistration. One detached task runs this from accept to removal.

use log::{debug, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::broadcast;

use crate::client::registry::ClientRegistry;
use crate::client::state::SharedWriter;
use crate::protocol::{
    NAME_PROMPT, QUIT_LINE, format_chat_message, join_notice, leave_notice, sanitize_display_name,
};

/// Size of the receive buffer; one read is one inbound message.
const BUFFER_SIZE: usize = 1024;

/// Inbound messages are cut to this many characters in debug log lines.
const LOG_PREVIEW_CHARS: usize = 50;

/// Runs one client session from handshake to removal.
///
/// - Prompts for a display name and reads it with a single receive; a peer
///   that disconnects first is removed without any join or leave notice.
/// - Relays every subsequent message as `[<name>] <content>\n` to all other
///   registered clients, until the quit line, a clean disconnect, a read
///   error, or the server-wide shutdown signal ends the session.
/// - Deregisters itself from the registry on the way out; removal is
///   idempotent, so racing the shutdown drain is harmless.
pub async fn handle_session(
    mut reader: OwnedReadHalf,
    writer: SharedWriter,
    addr: SocketAddr,
    registry: Arc<ClientRegistry>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    // Ask for a name. A failed send surfaces on the read below.
    {
        let mut writer = writer.lock().await;
        let _ = writer.write_all(NAME_PROMPT.as_bytes()).await;
    }

    let mut buf = [0u8; BUFFER_SIZE];

    let name = tokio::select! {
        received = reader.read(&mut buf) => match received {
            Ok(0) => {
                info!("Client {} disconnected before choosing a name", addr);
                registry.remove(addr).await;
                return;
            }
            Ok(n) => sanitize_display_name(&String::from_utf8_lossy(&buf[..n])),
            Err(e) => {
                error!("Handshake read failed for {}: {}", addr, e);
                registry.remove(addr).await;
                return;
            }
        },
        _ = shutdown_rx.recv() => {
            registry.remove(addr).await;
            return;
        }
    };

    registry.set_display_name(addr, &name).await;
    info!("New client: {} ({})", name, addr);
    registry.broadcast(&join_notice(&name), addr).await;

    // Chat loop: every read that yields data is one inbound message.
    let mut notify_leave = true;
    loop {
        let received = tokio::select! {
            received = reader.read(&mut buf) => received,
            // Also fires with an error once the server drops the channel,
            // so a session admitted in the middle of a shutdown still ends.
            _ = shutdown_rx.recv() => {
                info!("Session of {} interrupted by shutdown", name);
                notify_leave = false;
                break;
            }
        };

        match received {
            Ok(0) => {
                info!("Client {} disconnected", name);
                break;
            }
            Ok(n) => {
                let message = String::from_utf8_lossy(&buf[..n]).into_owned();
                debug!("Message from {}: {}", name, log_preview(&message));

                if message == QUIT_LINE {
                    info!("Client {} left", name);
                    break;
                }

                registry.broadcast(&format_chat_message(&name, &message), addr).await;
            }
            Err(e) => {
                error!("Error with {}: {}", name, e);
                break;
            }
        }
    }

    // The drain already closed everyone during shutdown; a leave notice at
    // that point would reach an emptied registry anyway.
    if notify_leave {
        registry.broadcast(&leave_notice(&name), addr).await;
    }
    registry.remove(addr).await;
}

/// Caps a message for its debug log line at [`LOG_PREVIEW_CHARS`]
/// characters, marking the cut with an ellipsis. The message itself is
/// untouched; only the log line is shortened.
fn log_preview(message: &str) -> String {
    match message.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}
