//! Shared session state
//!
//! One [`Session`] is built by the orchestrator and lent to the router and every
//! watcher. The only cross-task mutable state is the [`ShutdownFlag`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::PlayerConfig;
use crate::mpv::MpvClient;
use crate::splash::IdleScreen;

/// Process-wide stop request; goes from false to true once and never back
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Returns true only for the first caller.
    pub fn trigger(&self, reason: &str) -> bool {
        let first = !self.0.swap(true, Ordering::SeqCst);
        if first {
            info!(reason = %reason, "Shutdown requested");
        }
        first
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Resolve once the flag is set, checking every `poll`
    pub async fn wait(&self, poll: Duration) {
        while !self.is_set() {
            tokio::time::sleep(poll).await;
        }
    }
}

pub struct Session {
    pub config: PlayerConfig,
    pub client: MpvClient,
    pub idle_screen: Box<dyn IdleScreen>,
    pub shutdown: ShutdownFlag,
}

impl Session {
    pub fn new(config: PlayerConfig, idle_screen: Box<dyn IdleScreen>) -> Self {
        let client = MpvClient::new(&config.mpv_socket, config.ipc_timeout());
        Self {
            config,
            client,
            idle_screen,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// Render a fresh idle screen and load it into the player
    pub async fn show_idle_screen(&self) -> bool {
        match self.idle_screen.generate() {
            Ok(path) => self.client.load_file(&path).await,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Failed to render idle screen");
                false
            }
        }
    }
}
