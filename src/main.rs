use std::sync::Arc;
use tokio::sync::Notify;

use custom_error_pages::{config, logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg.logging)?;

    // Never serve with a broken default format
    let state = match config::AppState::new(cfg) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            logger::log_error(&format!("Invalid error page configuration: {e}"));
            return Err(e.into());
        }
    };

    // Create Tokio runtime, sizing the worker pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = state.config.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(state))
}

async fn async_main(state: Arc<config::AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &state.config);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(listener, state, shutdown).await?;
    logger::log_info("Server stopped");
    Ok(())
}
