//! Logging setup
//!
//! Configures the process-wide logging sink: one line per call on stderr,
//! tagged with timestamp, level, and the calling thread, safe to use
//! concurrently from every session task and the acceptor. Messages below
//! the minimum level are dropped; the default minimum is DEBUG and can be
//! overridden through `RUST_LOG`.

use std::io::Write;
use std::thread;

use env_logger::{Builder, Env};

/// Initialize the logger for the server process.
///
/// Panics if a logger was already installed, so call it once from `main`.
pub fn init() {
    builder().init();
}

/// Fallible initialization for tests, where several test functions may race
/// to install the logger. Output is captured per test.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    builder().is_test(true).try_init()
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or("debug"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] [{:?}] {}",
            buf.timestamp_seconds(),
            record.level(),
            thread::current().id(),
            record.args()
        )
    });
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{debug, error, info, warn};

    // The sink must hold up under concurrent use: ten threads each logging
    // at every level, none of them panicking or deadlocking.
    #[test]
    fn test_concurrent_logging_from_many_threads() {
        let _ = try_init();

        let handles: Vec<_> = (1..=10)
            .map(|id| {
                thread::spawn(move || {
                    info!("worker {} starting", id);
                    debug!("worker {} debug detail", id);
                    warn!("worker {} warning", id);
                    error!("worker {} hit an error", id);
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("logging thread panicked");
        }
    }
}
