//! Chat protocol implementation
//!
//! Owns the wire text exchanged with clients: handshake prompt, quit
//! command, system notices, and message formatting rules.

pub mod messages;

pub use messages::{
    DEFAULT_NAME, MAX_NAME_LEN, NAME_PROMPT, QUIT_COMMAND, QUIT_LINE, format_chat_message,
    join_notice, leave_notice, sanitize_display_name,
};
