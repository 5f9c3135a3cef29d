//! Module `messages`
//!
//! Defines the wire-level text of the chat protocol: the handshake prompt,
//! system notices, relayed message formatting, and the display name rules
//! applied during handshake.

/// Prompt sent to a client immediately after its connection is admitted.
pub const NAME_PROMPT: &str = "Digite seu nome de usuário: ";

/// Display name assigned when a client submits an empty name.
pub const DEFAULT_NAME: &str = "Anonimo";

/// Maximum display name length in bytes.
pub const MAX_NAME_LEN: usize = 31;

/// Command a client types to leave the chat.
pub const QUIT_COMMAND: &str = "/quit";

/// The exact inbound message that ends a session. Anything else, including
/// `/quit` without a newline or with extra bytes, is relayed as chat.
pub const QUIT_LINE: &str = "/quit\n";

/// Derives the display name from the raw handshake bytes.
///
/// Strips a single trailing newline, substitutes [`DEFAULT_NAME`] for an
/// empty submission, and truncates to [`MAX_NAME_LEN`] bytes without
/// splitting a UTF-8 character. Truncation is idempotent: sanitizing an
/// already-sanitized name returns it unchanged.
pub fn sanitize_display_name(raw: &str) -> String {
    let name = raw.strip_suffix('\n').unwrap_or(raw);
    if name.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    truncate_at_boundary(name, MAX_NAME_LEN).to_string()
}

/// Formats an inbound chat message for relay as `[<name>] <content>\n`.
///
/// One trailing newline is stripped from the content before formatting, so
/// the relayed message always ends with exactly one newline of its own.
pub fn format_chat_message(name: &str, content: &str) -> String {
    let content = content.strip_suffix('\n').unwrap_or(content);
    format!("[{}] {}\n", name, content)
}

/// Notice broadcast when a client finishes the handshake.
pub fn join_notice(name: &str) -> String {
    format!("--- {} entrou no chat ---\n", name)
}

/// Notice broadcast when a client that reached the chat leaves it.
pub fn leave_notice(name: &str) -> String {
    format!("--- {} saiu do chat ---\n", name)
}

/// Truncates to at most `cap` bytes, backing up to the nearest character
/// boundary so multi-byte characters are never split.
fn truncate_at_boundary(name: &str, cap: usize) -> &str {
    if name.len() <= cap {
        return name;
    }
    let mut end = cap;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
