//! Client management system
//!
//! Handles client connections, registry membership, message broadcast, and
//! session lifecycle.

pub mod handler;
pub mod registry;
pub mod state;

pub use handler::handle_session;
pub use registry::ClientRegistry;
pub use state::{Client, SharedWriter};
