// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown (sent by the kubelet on pod termination)
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start signal handlers (Unix only)
///
/// Spawns a background task that notifies `shutdown` once on the first
/// SIGTERM or SIGINT.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        logger::log_debug(&format!(
            "[SIGNAL] Handlers registered for SIGTERM and SIGINT, pid {}",
            std::process::id()
        ));

        tokio::select! {
            _ = sigterm.recv() => logger::log_info("[SIGNAL] SIGTERM received, shutting down"),
            _ = sigint.recv() => logger::log_info("[SIGNAL] SIGINT received, shutting down"),
        }

        // Stores a permit, so a loop not currently awaiting still sees it
        shutdown.notify_one();
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
                shutdown.notify_one();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}
