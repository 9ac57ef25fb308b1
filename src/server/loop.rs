// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Poll interval while waiting for connections to drain
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` is notified
///
/// After shutdown the listener is closed first, then in-flight connections
/// get `performance.shutdown_grace_period` seconds to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_info("[Shutdown] Signal received, closing listener");
                break;
            }
        }
    }

    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_period);
    drain_connections(&state, grace).await;
    Ok(())
}

/// Wait until no connection is active or `grace` has elapsed
async fn drain_connections(state: &config::AppState, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let active = state.active_connections.load(Ordering::SeqCst);
        if active == 0 {
            logger::log_info("[Shutdown] All connections closed");
            return;
        }

        tokio::select! {
            () = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
            () = tokio::time::sleep_until(deadline) => {
                logger::log_warning(&format!(
                    "[Shutdown] Grace period elapsed with {active} connection(s) still open"
                ));
                return;
            }
        }
    }
}
