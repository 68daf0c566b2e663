//! Player settings persisted as JSON
//!
//! Every field has a default from [`crate::constants::defaults`], so a missing
//! file or a partial file both produce a complete configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::defaults::{paths, scan, timing};
use crate::constants::{config, splash};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Directory searched for videos matching a scanned name
    pub media_dir: PathBuf,
    /// Directory the idle screen image is written to
    pub assets_dir: PathBuf,
    pub mpv_socket: PathBuf,
    pub mpv_binary: String,
    /// Optional mpv input.conf restricting on-screen key bindings
    pub mpv_input_conf: Option<PathBuf>,
    /// Playable extensions, lowercase without the leading dot
    pub video_extensions: Vec<String>,
    pub command_prefix: String,
    pub volume_step: i32,
    pub seek_step_seconds: i32,
    /// Substring of the scanner's input device name
    pub scanner_device_name: String,
    pub scan_debounce_ms: u64,
    pub scanner_reconnect_ms: u64,
    pub idle_poll_ms: u64,
    pub liveness_poll_ms: u64,
    pub exit_key_rescan_ms: u64,
    pub shutdown_poll_ms: u64,
    pub socket_wait_attempts: u32,
    pub socket_wait_interval_ms: u64,
    pub ipc_timeout_ms: u64,
    pub terminate_grace_ms: u64,
    /// Font family for the idle screen; empty uses the built-in candidates
    pub splash_font: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from(paths::MEDIA_DIR),
            assets_dir: PathBuf::from(paths::ASSETS_DIR),
            mpv_socket: PathBuf::from(paths::MPV_SOCKET),
            mpv_binary: paths::MPV_BINARY.to_string(),
            mpv_input_conf: None,
            video_extensions: scan::VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            command_prefix: scan::COMMAND_PREFIX.to_string(),
            volume_step: scan::VOLUME_STEP,
            seek_step_seconds: scan::SEEK_STEP_SECONDS,
            scanner_device_name: scan::SCANNER_DEVICE_NAME.to_string(),
            scan_debounce_ms: scan::DEBOUNCE_MS,
            scanner_reconnect_ms: timing::SCANNER_RECONNECT_MS,
            idle_poll_ms: timing::IDLE_POLL_MS,
            liveness_poll_ms: timing::LIVENESS_POLL_MS,
            exit_key_rescan_ms: timing::EXIT_KEY_RESCAN_MS,
            shutdown_poll_ms: timing::SHUTDOWN_POLL_MS,
            socket_wait_attempts: timing::SOCKET_WAIT_ATTEMPTS,
            socket_wait_interval_ms: timing::SOCKET_WAIT_INTERVAL_MS,
            ipc_timeout_ms: timing::IPC_TIMEOUT_MS,
            terminate_grace_ms: timing::TERMINATE_GRACE_MS,
            splash_font: None,
        }
    }
}

impl PlayerConfig {
    /// Default config file location, honouring the directory override env var
    pub fn path() -> PathBuf {
        let mut path = match std::env::var_os(config::DIR_ENV_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(config::APP_DIR),
        };
        path.push(config::FILENAME);
        path
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Self::default().validated();
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: PlayerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        info!(path = %path.display(), "Loaded config");
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.command_prefix.trim().is_empty() {
            anyhow::bail!("command_prefix must not be empty");
        }
        if self.volume_step == 0 {
            anyhow::bail!("volume_step must not be zero");
        }
        if self.seek_step_seconds == 0 {
            anyhow::bail!("seek_step_seconds must not be zero");
        }

        self.video_extensions = self
            .video_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if self.video_extensions.is_empty() {
            anyhow::bail!("video_extensions must list at least one extension");
        }

        // Commands are matched against uppercased scans
        self.command_prefix = self.command_prefix.to_uppercase();

        Ok(self)
    }

    /// Where the idle screen image is written
    pub fn splash_path(&self) -> PathBuf {
        self.assets_dir.join(splash::FILENAME)
    }

    pub fn scan_debounce(&self) -> Duration {
        Duration::from_millis(self.scan_debounce_ms)
    }

    pub fn scanner_reconnect(&self) -> Duration {
        Duration::from_millis(self.scanner_reconnect_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn liveness_poll(&self) -> Duration {
        Duration::from_millis(self.liveness_poll_ms)
    }

    pub fn exit_key_rescan(&self) -> Duration {
        Duration::from_millis(self.exit_key_rescan_ms)
    }

    pub fn shutdown_poll(&self) -> Duration {
        Duration::from_millis(self.shutdown_poll_ms)
    }

    pub fn socket_wait_interval(&self) -> Duration {
        Duration::from_millis(self.socket_wait_interval_ms)
    }

    pub fn ipc_timeout(&self) -> Duration {
        Duration::from_millis(self.ipc_timeout_ms)
    }

    pub fn terminate_grace(&self) -> Duration {
        Duration::from_millis(self.terminate_grace_ms)
    }
}
