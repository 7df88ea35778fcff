//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install signal handler ({}), falling back to ctrl-c", e);
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received ctrl-c"),
                Err(e) => {
                    // Without any signal source the server runs until killed.
                    warn!("Failed to listen for ctrl-c: {}", e);
                    std::future::pending::<()>().await;
                }
            }
            return;
        }
    };
    let handle = signals.handle();

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    handle.close();
}
