// Signal handling module
//
// SIGINT / SIGTERM (Ctrl+C on other platforms) trigger graceful shutdown.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Spawn a task that notifies `shutdown` on the first termination signal
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => logger::log_info("[SIGNAL] SIGTERM received"),
            _ = sigint.recv() => logger::log_info("[SIGNAL] SIGINT received"),
        }
        shutdown.notify_one();
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::log_info("[SIGNAL] Ctrl+C received");
            shutdown.notify_one();
        }
    });
    Ok(())
}
