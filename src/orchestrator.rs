//! Player lifecycle
//!
//! Startup, the concurrent run phase, and teardown. The run phase is one
//! `tokio::select!`: the first task to finish wins and the rest are dropped,
//! which releases the scanner grab, before mpv is stopped.

use anyhow::{Context, Result};
use std::fs;
use tracing::{error, info};

use crate::config::PlayerConfig;
use crate::input::{scanner, stdin};
use crate::mpv::MpvProcess;
use crate::router::ScanRouter;
use crate::session::Session;
use crate::splash::SplashRenderer;
use crate::watchers::shutdown::{SignalListener, wait_for_shutdown};
use crate::watchers::{exit_keys, idle, liveness};

/// Where scans come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Scanner,
    /// Lines typed on stdin
    Keyboard,
}

fn prepare_filesystem(config: &PlayerConfig) -> Result<()> {
    fs::create_dir_all(&config.media_dir)
        .with_context(|| format!("Failed to create media directory {}", config.media_dir.display()))?;

    if config.mpv_socket.exists() {
        fs::remove_file(&config.mpv_socket)
            .with_context(|| format!("Failed to remove stale socket {}", config.mpv_socket.display()))?;
        info!(socket = %config.mpv_socket.display(), "Removed stale mpv socket");
    }
    Ok(())
}

pub async fn run(config: PlayerConfig, mode: InputMode) -> Result<()> {
    prepare_filesystem(&config)?;

    info!(binary = %config.mpv_binary, "Starting mpv");
    let process = MpvProcess::launch(&config)?;

    if !MpvProcess::wait_for_socket(&config.mpv_socket, config.socket_wait_attempts, config.socket_wait_interval()).await
    {
        error!(socket = %config.mpv_socket.display(), "mpv socket did not appear");
        process.shutdown(config.terminate_grace()).await;
        anyhow::bail!("mpv control socket {} never appeared", config.mpv_socket.display());
    }
    info!("mpv is ready");

    let signals = SignalListener::install()?;
    let idle_screen = SplashRenderer::new(&config);
    let session = Session::new(config, Box::new(idle_screen));

    session.show_idle_screen().await;

    let mut router = ScanRouter::new(&session);
    let config = &session.config;
    let shutdown = &session.shutdown;
    let ingest = async {
        match mode {
            InputMode::Scanner => scanner::read_scans(config, &mut router).await,
            InputMode::Keyboard => stdin::read_stdin_scans(&mut router, shutdown).await,
        }
    };
    supervise(&session, process, signals, ingest).await;

    info!("Goodbye!");
    Ok(())
}

/// Run scan ingestion next to every watcher until the first one finishes, then
/// stop mpv. The losers are dropped before mpv is touched.
async fn supervise<F>(session: &Session, mut process: MpvProcess, signals: SignalListener, ingest: F)
where
    F: Future<Output = ()>,
{
    let config = &session.config;
    let shutdown = &session.shutdown;

    tokio::select! {
        _ = ingest => info!("Scan input ended"),
        _ = idle::watch_idle(session) => {}
        _ = liveness::watch_player(&mut process, shutdown, config.liveness_poll()) => {}
        _ = exit_keys::watch_exit_keys(config, shutdown) => {}
        _ = wait_for_shutdown(shutdown, config.shutdown_poll()) => {}
        _ = signals.run(shutdown) => {}
    }

    // Every exit path leaves the flag set
    shutdown.trigger("run phase ended");

    info!("Terminating mpv");
    process.shutdown(config.terminate_grace()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpv::client::tests::StubMpv;
    use crate::session::tests::session_for;
    use nix::errno::Errno;
    use nix::sys::signal;
    use nix::unistd::Pid;
    use std::time::Duration;

    fn fast_config() -> PlayerConfig {
        PlayerConfig {
            idle_poll_ms: 20,
            liveness_poll_ms: 10,
            shutdown_poll_ms: 5,
            exit_key_rescan_ms: 50,
            terminate_grace_ms: 2000,
            ..PlayerConfig::default()
        }
    }

    fn is_reaped(pid: u32) -> bool {
        signal::kill(Pid::from_raw(pid as i32), None) == Err(Errno::ESRCH)
    }

    #[test]
    fn test_prepare_filesystem_creates_media_and_clears_socket() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig {
            media_dir: dir.path().join("media").join("videos"),
            mpv_socket: dir.path().join("mpv.sock"),
            ..PlayerConfig::default()
        };
        fs::write(&config.mpv_socket, "").unwrap();

        prepare_filesystem(&config).unwrap();

        assert!(config.media_dir.is_dir());
        assert!(!config.mpv_socket.exists());
    }

    #[tokio::test]
    async fn test_missing_socket_is_fatal_and_player_stopped() {
        let dir = tempfile::tempdir().unwrap();
        // A "player" that never opens the socket
        let config = PlayerConfig {
            media_dir: dir.path().join("media"),
            assets_dir: dir.path().join("assets"),
            mpv_socket: dir.path().join("mpv.sock"),
            mpv_binary: "true".to_string(),
            socket_wait_attempts: 3,
            socket_wait_interval_ms: 5,
            terminate_grace_ms: 500,
            ..PlayerConfig::default()
        };

        let err = run(config, InputMode::Keyboard).await.unwrap_err();
        assert!(err.to_string().contains("never appeared"));
    }

    #[tokio::test]
    async fn test_exit_scan_stops_everything_and_reaps_player() {
        let stub = StubMpv::idle(false).await;
        let (session, _) = session_for(&stub, fast_config());
        let process = MpvProcess::spawn("sleep", &["30".to_string()]).unwrap();
        let pid = process.id().unwrap();
        let signals = SignalListener::install().unwrap();

        let mut router = ScanRouter::new(&session);
        let ingest = async {
            router.route("CMD:EXIT").await;
            std::future::pending::<()>().await
        };

        tokio::time::timeout(Duration::from_secs(5), supervise(&session, process, signals, ingest))
            .await
            .unwrap();

        assert!(session.shutdown.is_set());
        assert!(!session.shutdown.trigger("late trigger"));
        assert!(is_reaped(pid));
    }

    #[tokio::test]
    async fn test_player_exit_ends_run_phase() {
        let stub = StubMpv::idle(false).await;
        let (session, _) = session_for(&stub, fast_config());
        let process = MpvProcess::spawn("true", &[]).unwrap();
        let pid = process.id().unwrap();
        let signals = SignalListener::install().unwrap();

        tokio::time::timeout(
            Duration::from_secs(5),
            supervise(&session, process, signals, std::future::pending::<()>()),
        )
        .await
        .unwrap();

        assert!(session.shutdown.is_set());
        assert!(is_reaped(pid));
        assert!(stub.commands().iter().all(|c| c[0] == "get_property"));
    }
}
