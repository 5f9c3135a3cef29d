//! End-to-end tests driving a real server instance with real TCP clients.
//!
//! Each test binds its own server on an ephemeral port, so they run in
//! parallel without interfering.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::timeout;

use vox_chat_server::{Server, ServerConfig};

const READ_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// Binds a server on an ephemeral port and runs it in a background task.
async fn start_server(max_clients: usize) -> (SocketAddr, broadcast::Sender<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_clients,
    };
    let server = Server::bind(&config).expect("server bind failed");
    let addr = server.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move { server.start().await });
    (addr, shutdown)
}

/// One bounded read, returned as text.
async fn read_some(stream: &mut TcpStream) -> String {
    let mut buf = [0u8; 1024];
    let n = timeout(READ_TIMEOUT, stream.read(&mut buf))
        .await
        .expect("read timed out")
        .expect("read failed");
    String::from_utf8_lossy(&buf[..n]).into_owned()
}

/// Asserts the peer sends nothing for a short window.
async fn assert_silent(stream: &mut TcpStream) {
    let mut buf = [0u8; 1024];
    let outcome = timeout(SILENCE_WINDOW, stream.read(&mut buf)).await;
    assert!(outcome.is_err(), "expected silence, got {:?}", outcome);
}

/// Connects and completes the handshake with the given name.
async fn connect_named(addr: SocketAddr, name: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let prompt = read_some(&mut stream).await;
    assert!(
        prompt.contains("nome"),
        "expected the name prompt, got {:?}",
        prompt
    );
    stream
        .write_all(format!("{}\n", name).as_bytes())
        .await
        .unwrap();
    stream
}

#[tokio::test]
async fn test_message_relayed_to_others_not_sender() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut bob = connect_named(addr, "Bob").await;

    // Bob's join notice reaching Alice proves Bob is active.
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");

    alice.write_all(b"hello\n").await.unwrap();

    assert_eq!(read_some(&mut bob).await, "[Alice] hello\n");
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_relay_reterminates_with_one_newline() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut bob = connect_named(addr, "Bob").await;
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");

    // No trailing newline from the client; the relay adds exactly one.
    alice.write_all(b"sem enter").await.unwrap();
    assert_eq!(read_some(&mut bob).await, "[Alice] sem enter\n");
}

#[tokio::test]
async fn test_capacity_rejection_closes_third_connection() {
    let (addr, _shutdown) = start_server(2).await;

    let mut first = TcpStream::connect(addr).await.unwrap();
    assert!(!read_some(&mut first).await.is_empty());
    let mut second = TcpStream::connect(addr).await.unwrap();
    assert!(!read_some(&mut second).await.is_empty());

    // The third connection is accepted, then closed with nothing written.
    let mut third = TcpStream::connect(addr).await.unwrap();
    let mut buf = [0u8; 64];
    let n = timeout(READ_TIMEOUT, third.read(&mut buf))
        .await
        .expect("rejected connection was not closed")
        .expect("read failed");
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_empty_name_becomes_anonimo() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut anon = TcpStream::connect(addr).await.unwrap();
    let _prompt = read_some(&mut anon).await;
    anon.write_all(b"\n").await.unwrap();

    assert_eq!(
        read_some(&mut alice).await,
        "--- Anonimo entrou no chat ---\n"
    );
}

#[tokio::test]
async fn test_long_name_truncated_in_notices() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let _long = connect_named(addr, &"n".repeat(64)).await;

    let expected = format!("--- {} entrou no chat ---\n", "n".repeat(31));
    assert_eq!(read_some(&mut alice).await, expected);
}

#[tokio::test]
async fn test_quit_is_not_relayed_but_leave_notice_is() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut bob = connect_named(addr, "Bob").await;
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");

    bob.write_all(b"/quit\n").await.unwrap();

    // The quit line itself never shows up; the next thing Alice sees is
    // the leave notice.
    assert_eq!(read_some(&mut alice).await, "--- Bob saiu do chat ---\n");
}

#[tokio::test]
async fn test_quit_without_newline_is_ordinary_chat() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut bob = connect_named(addr, "Bob").await;
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");

    bob.write_all(b"/quit").await.unwrap();
    assert_eq!(read_some(&mut alice).await, "[Bob] /quit\n");
}

#[tokio::test]
async fn test_disconnect_broadcasts_leave_notice() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let bob = connect_named(addr, "Bob").await;
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");

    drop(bob);

    assert_eq!(read_some(&mut alice).await, "--- Bob saiu do chat ---\n");
}

#[tokio::test]
async fn test_disconnect_before_handshake_is_silent() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;

    // Peer leaves before ever sending a name: no join, no leave.
    let mut ghost = TcpStream::connect(addr).await.unwrap();
    let _prompt = read_some(&mut ghost).await;
    drop(ghost);

    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_slot_freed_after_quit() {
    let (addr, _shutdown) = start_server(1).await;

    let mut only = connect_named(addr, "Solo").await;
    only.write_all(b"/quit\n").await.unwrap();
    let mut buf = [0u8; 64];
    // The server shuts the stream down on removal.
    assert_eq!(only.read(&mut buf).await.unwrap(), 0);

    // Removal races the next accept, so retry until the slot is free.
    for attempt in 0.. {
        let mut next = TcpStream::connect(addr).await.unwrap();
        let n = timeout(READ_TIMEOUT, next.read(&mut buf))
            .await
            .expect("read timed out")
            .unwrap();
        if n > 0 {
            return;
        }
        assert!(attempt < 20, "slot never became free again");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_shutdown_drains_connected_clients() {
    let (addr, shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut bob = connect_named(addr, "Bob").await;
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");

    shutdown.send(()).unwrap();

    // Both streams are closed underneath the sessions; no leave notices
    // are delivered during the drain.
    let mut buf = [0u8; 64];
    let alice_last = timeout(READ_TIMEOUT, alice.read(&mut buf))
        .await
        .expect("alice was not disconnected")
        .unwrap();
    assert_eq!(alice_last, 0);
    let bob_last = timeout(READ_TIMEOUT, bob.read(&mut buf))
        .await
        .expect("bob was not disconnected")
        .unwrap();
    assert_eq!(bob_last, 0);

    // New connections are no longer accepted once the loop has exited.
    if let Ok(mut late) = TcpStream::connect(addr).await {
        let n = timeout(READ_TIMEOUT, late.read(&mut buf))
            .await
            .expect("late connection was not closed")
            .unwrap_or(0);
        assert_eq!(n, 0);
    }
}

#[tokio::test]
async fn test_three_way_relay() {
    let (addr, _shutdown) = start_server(10).await;

    let mut alice = connect_named(addr, "Alice").await;
    let mut bob = connect_named(addr, "Bob").await;
    assert_eq!(read_some(&mut alice).await, "--- Bob entrou no chat ---\n");
    let mut carol = connect_named(addr, "Carol").await;
    assert_eq!(read_some(&mut alice).await, "--- Carol entrou no chat ---\n");
    assert_eq!(read_some(&mut bob).await, "--- Carol entrou no chat ---\n");

    carol.write_all(b"oi pessoal\n").await.unwrap();

    assert_eq!(read_some(&mut alice).await, "[Carol] oi pessoal\n");
    assert_eq!(read_some(&mut bob).await, "[Carol] oi pessoal\n");
    assert_silent(&mut carol).await;
}
