//! Shutdown coordinator and OS signal listener

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::info;

use crate::session::ShutdownFlag;

/// Join point for every exit trigger: completes once the flag is set
pub async fn wait_for_shutdown(shutdown: &ShutdownFlag, poll: Duration) {
    shutdown.wait(poll).await;
    info!("Shutdown requested, stopping");
}

/// SIGINT / SIGTERM handlers, registered before the watchers start
pub struct SignalListener {
    sigint: Signal,
    sigterm: Signal,
}

impl SignalListener {
    pub fn install() -> Result<Self> {
        let sigint = signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
        let sigterm = signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
        Ok(Self { sigint, sigterm })
    }

    /// Wait for either signal and turn it into a shutdown request
    pub async fn run(mut self, shutdown: &ShutdownFlag) {
        let name = tokio::select! {
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        };
        info!(signal = name, "Received termination signal");
        shutdown.trigger(name);
    }
}
