//! Media player liveness

use std::time::Duration;
use tracing::info;

use crate::mpv::MpvProcess;
use crate::session::ShutdownFlag;

/// Request shutdown as soon as the player process is gone (closed window, crash)
pub async fn watch_player(process: &mut MpvProcess, shutdown: &ShutdownFlag, poll: Duration) {
    while !shutdown.is_set() {
        if let Some(status) = process.try_exit_status() {
            info!(status = %status, "Media player exited");
            shutdown.trigger("media player exited");
            return;
        }
        tokio::time::sleep(poll).await;
    }
}
