//! mpv process lifecycle
//!
//! Launch with the fixed kiosk argument list, liveness checks, and the single
//! graceful-then-forced termination path.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::constants::mpv;

pub struct MpvProcess {
    child: Child,
}

impl MpvProcess {
    /// Full argument list for a kiosk mpv instance
    pub fn arguments(config: &PlayerConfig) -> Vec<String> {
        let mut args: Vec<String> = mpv::BASE_ARGS.iter().map(|a| a.to_string()).collect();
        args.push(format!("--input-ipc-server={}", config.mpv_socket.display()));
        if let Some(conf) = &config.mpv_input_conf {
            args.push(format!("--input-conf={}", conf.display()));
        }
        args
    }

    pub fn launch(config: &PlayerConfig) -> Result<Self> {
        Self::spawn(&config.mpv_binary, &Self::arguments(config))
    }

    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", program))?;

        info!(program = %program, pid = ?child.id(), "Started media player");
        debug!(args = ?args, "Media player arguments");
        Ok(Self { child })
    }

    /// Exit status if the process has already ended
    pub fn try_exit_status(&mut self) -> Option<ExitStatus> {
        match self.child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Failed to poll media player status");
                None
            }
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(test)]
    pub fn has_exited(&mut self) -> bool {
        self.try_exit_status().is_some()
    }

    /// Poll for the control socket to appear
    pub async fn wait_for_socket(path: &Path, attempts: u32, interval: Duration) -> bool {
        for attempt in 1..=attempts {
            if path.exists() {
                debug!(socket = %path.display(), attempt, "Control socket ready");
                return true;
            }
            tokio::time::sleep(interval).await;
        }
        path.exists()
    }

    /// SIGTERM, wait up to `grace`, then SIGKILL. Consumes the handle so it runs once.
    pub async fn shutdown(mut self, grace: Duration) {
        if let Some(status) = self.try_exit_status() {
            info!(status = %status, "Media player already exited");
            return;
        }

        let Some(pid) = self.child.id() else {
            return;
        };

        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                warn!(pid, error = %e, "Failed to send SIGTERM to media player");
            } else {
                debug!(pid, "SIGTERM sent");
            }
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => info!(pid, status = %status, "Media player exited"),
            Ok(Err(e)) => warn!(pid, error = %e, "Failed to wait for media player exit"),
            Err(_) => {
                warn!(pid, grace_secs = grace.as_secs_f32(), "Media player ignored SIGTERM, killing");
                if let Err(e) = self.child.kill().await {
                    warn!(pid, error = %e, "Failed to kill media player");
                }
            }
        }
    }
}
