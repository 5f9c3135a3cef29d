//! Terminal chat client
//!
//! Thin read/write loop over the server connection: one task copies
//! everything the server sends to stdout, the main loop forwards stdin
//! lines. `/quit` or Ctrl+C ends the session.

use std::process::ExitCode;

use tokio::io::{self, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::signal;

const SERVER_ADDR: &str = "127.0.0.1:8080";
const QUIT_COMMAND: &str = "/quit";

#[tokio::main]
async fn main() -> ExitCode {
    println!("Conectando ao servidor...");
    let stream = match TcpStream::connect(SERVER_ADDR).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Falha na conexão: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (mut reader, mut writer) = stream.into_split();

    println!("Conectado ao servidor! Digite /quit para sair.");
    println!("--------------------------------------------");

    // Everything the server sends goes straight to stdout.
    let mut receiver = tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => {
                    println!("\n--- Conexão com o servidor perdida ---");
                    return;
                }
                Ok(n) => {
                    let mut stdout = io::stdout();
                    let _ = stdout.write_all(&buf[..n]).await;
                    let _ = stdout.flush().await;
                }
            }
        }
    });

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let outbound = format!("{}\n", line.trim_end_matches('\n'));
                if writer.write_all(outbound.as_bytes()).await.is_err() {
                    eprintln!("Erro ao enviar mensagem");
                    break;
                }
                if line == QUIT_COMMAND {
                    break;
                }
            }
            _ = signal::ctrl_c() => break,
            _ = &mut receiver => break,
        }
    }

    println!("Desconectando...");
    let _ = writer.shutdown().await;
    receiver.abort();
    println!("Cliente encerrado.");
    ExitCode::SUCCESS
}
