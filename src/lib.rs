//! Vox Chat Server
//!
//! A TCP chat server: clients connect, pick a display name, and every line
//! they send is relayed to all other connected clients.

pub mod client;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;

pub use server::{Server, ServerConfig};
