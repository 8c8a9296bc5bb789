//! sotto-daemon: the messaging session daemon.
//!
//! Single OS process running a Tokio async runtime. Command units
//! arrive over a Unix socket; session events go out to subscribers.

mod config;
mod intake;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use sotto_session::Session;

use crate::config::DaemonConfig;
use crate::intake::IntakeServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sotto=info".parse()?),
        )
        .init();

    info!("Sotto daemon starting");

    // 1. Load config
    let config = DaemonConfig::load()?;
    let data_dir = config.data_dir();

    // Ensure data directory exists
    std::fs::create_dir_all(&data_dir)?;

    // 2. Build the session
    let session = Arc::new(Session::new());

    // 3. Create shutdown channel
    let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

    // 4. Log session events
    let mut events = session.subscribe();
    let mut event_shutdown = shutdown_tx.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        debug!(event_type = %event.event_type, "session event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = event_shutdown.recv() => break,
            }
        }
    });

    // 5. Sweep stale contact offers periodically
    let sweeper_session = session.clone();
    let offer_ttl = config.contacts.offer_ttl_secs;
    let sweep_interval = Duration::from_secs(config.contacts.sweep_interval_secs.max(1));
    let mut sweeper_shutdown = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let expired = sweeper_session.sweep_expired(offer_ttl);
                    if !expired.is_empty() {
                        info!(count = expired.len(), "expired stale contact offers");
                    }
                }
                _ = sweeper_shutdown.recv() => break,
            }
        }
    });

    // 6. Start the intake server
    let socket_path = config.socket_path();
    let intake_server = IntakeServer::new(session, socket_path.clone());

    info!("Starting intake on {:?}", socket_path);

    // 7. Run until shutdown
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        result = intake_server.run() => {
            if let Err(e) = result {
                error!("intake server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Graceful shutdown
    info!("Daemon shutting down gracefully");
    let _ = shutdown_tx.send(());

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}
