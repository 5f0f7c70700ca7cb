//! Edge control daemon.
//!
//! Serves the control API until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use tokio::signal::unix::{self, SignalKind};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use edge_control::api::{self, AppState};
use edge_control::config::Config;
use edge_control::temperature;
use edge_control::tracing::{self, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    tracing::init_journald_or_stdout();

    let config = Config::from_env().context("loading configuration")?;
    debug!(?config, "Loaded configuration.");

    let source = temperature::from_config(&config)?;
    if config.source == edge_control::config::SourceMode::Daemon {
        info!(
            url = %config.daemon.url,
            timeout_ms = config.daemon.timeout.as_millis() as u64,
            "Proxying temperature readings to daemon."
        );
    }

    let state = AppState::new(source, config.api.client_dir.clone());
    let listener = api::bind(config.api.listen)
        .await
        .with_context(|| format!("binding {}", config.api.listen))?;

    let running = CancellationToken::new();
    let tracker = TaskTracker::new();
    tracker.spawn(api::task(listener, state, running.clone()));
    tracker.close();
    info!("Started.");

    let mut sigint = unix::signal(SignalKind::interrupt())?;
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = running.cancelled() => {},
    }

    trace!("Shutting down.");
    running.cancel();

    tracker.wait().await;
    info!("Exiting.");
    Ok(())
}
