//! Scan router
//!
//! Turns each completed scan into at most one player action:
//! debounce, reject path-like input, then either a prefixed command or a media
//! lookup by filename stem.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::constants::commands;
use crate::input::ScanHandler;
use crate::library;
use crate::session::Session;

/// Transport commands a QR code may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Pause,
    Stop,
    VolumeUp,
    VolumeDown,
    Mute,
    Forward,
    Rewind,
    Exit,
}

impl FromStr for PlayerCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            commands::PAUSE => Ok(Self::Pause),
            commands::STOP => Ok(Self::Stop),
            commands::VOLUP => Ok(Self::VolumeUp),
            commands::VOLDOWN => Ok(Self::VolumeDown),
            commands::MUTE => Ok(Self::Mute),
            commands::FWD => Ok(Self::Forward),
            commands::RWD => Ok(Self::Rewind),
            commands::EXIT => Ok(Self::Exit),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Contains `/` or `..`
    PathTraversal,
    UnknownCommand(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathTraversal => write!(f, "path separator or parent directory in scan"),
            Self::UnknownCommand(token) => write!(f, "unknown command '{}'", token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanClassification {
    Command(PlayerCommand),
    /// Original-case text to resolve as a filename stem
    MediaRequest(String),
    Rejected(RejectReason),
}

/// Classify trimmed scan text. `prefix` must already be uppercase.
pub fn classify(text: &str, prefix: &str) -> ScanClassification {
    // Runs on the raw text before any case folding or prefix handling
    if text.contains('/') || text.contains("..") {
        return ScanClassification::Rejected(RejectReason::PathTraversal);
    }

    let normalized = text.to_uppercase();
    match normalized.strip_prefix(prefix) {
        // Exact match only: "CMD: PAUSE" is not a command
        Some(token) => match token.parse() {
            Ok(command) => ScanClassification::Command(command),
            Err(()) => ScanClassification::Rejected(RejectReason::UnknownCommand(token.to_string())),
        },
        None => ScanClassification::MediaRequest(text.to_string()),
    }
}

/// Last accepted scan and when it was accepted
#[derive(Debug)]
pub struct DebounceState {
    last: Option<(String, Instant)>,
    window: Duration,
}

impl DebounceState {
    pub fn new(window: Duration) -> Self {
        Self { last: None, window }
    }

    /// Accept unless `text` repeats the last accepted scan within the window
    pub fn accept(&mut self, text: &str, now: Instant) -> bool {
        if let Some((last, at)) = &self.last
            && last == text
            && now.saturating_duration_since(*at) < self.window
        {
            return false;
        }
        self.last = Some((text.to_string(), now));
        true
    }
}

pub struct ScanRouter<'a> {
    session: &'a Session,
    debounce: DebounceState,
}

impl<'a> ScanRouter<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            debounce: DebounceState::new(session.config.scan_debounce()),
        }
    }

    pub async fn route(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if !self.debounce.accept(text, Instant::now()) {
            debug!(text = %text, "Debounced repeat scan");
            return;
        }

        match classify(text, &self.session.config.command_prefix) {
            ScanClassification::Command(command) => self.dispatch(command).await,
            ScanClassification::MediaRequest(stem) => self.play(&stem).await,
            ScanClassification::Rejected(reason) => warn!(text = %text, reason = %reason, "Rejected scan"),
        }
    }

    async fn dispatch(&self, command: PlayerCommand) {
        info!(command = ?command, "Command");
        let config = &self.session.config;
        let client = &self.session.client;

        match command {
            PlayerCommand::Pause => {
                client.toggle_pause().await;
            }
            PlayerCommand::Stop => {
                client.stop().await;
                self.session.show_idle_screen().await;
            }
            PlayerCommand::VolumeUp => {
                client.add_volume(config.volume_step).await;
            }
            PlayerCommand::VolumeDown => {
                client.add_volume(-config.volume_step).await;
            }
            PlayerCommand::Mute => {
                client.toggle_mute().await;
            }
            PlayerCommand::Forward => {
                client.seek(config.seek_step_seconds).await;
            }
            PlayerCommand::Rewind => {
                client.seek(-config.seek_step_seconds).await;
            }
            PlayerCommand::Exit => {
                self.session.shutdown.trigger("exit command scanned");
            }
        }
    }

    async fn play(&self, stem: &str) {
        let config = &self.session.config;
        match library::find_video(&config.media_dir, stem, &config.video_extensions) {
            Some(path) => {
                info!(path = %path.display(), "Playing");
                self.session.client.load_file(&path).await;
            }
            None => warn!(name = %stem, media_dir = %config.media_dir.display(), "No video found"),
        }
    }
}

impl ScanHandler for ScanRouter<'_> {
    async fn handle_scan(&mut self, text: String) {
        self.route(&text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::mpv::client::tests::StubMpv;
    use crate::session::tests::session_for;

    #[test]
    fn test_classify_commands_case_insensitive() {
        assert_eq!(classify("cmd:volup", "CMD:"), ScanClassification::Command(PlayerCommand::VolumeUp));
        assert_eq!(classify("CMD:Pause", "CMD:"), ScanClassification::Command(PlayerCommand::Pause));
        assert_eq!(classify("CMD:EXIT", "CMD:"), ScanClassification::Command(PlayerCommand::Exit));
    }

    #[test]
    fn test_classify_rejects_path_like_text_first() {
        let traversal = ScanClassification::Rejected(RejectReason::PathTraversal);
        assert_eq!(classify("CMD:PAUSE/../x", "CMD:"), traversal);
        assert_eq!(classify("../secret", "CMD:"), traversal);
        assert_eq!(classify("movies/bambi", "CMD:"), traversal);
        assert_eq!(classify("bambi..", "CMD:"), traversal);
    }

    #[test]
    fn test_classify_unknown_command() {
        assert_eq!(
            classify("CMD:FOO", "CMD:"),
            ScanClassification::Rejected(RejectReason::UnknownCommand("FOO".to_string()))
        );
    }

    #[test]
    fn test_classify_padded_command_rejected() {
        assert_eq!(
            classify("CMD: PAUSE", "CMD:"),
            ScanClassification::Rejected(RejectReason::UnknownCommand(" PAUSE".to_string()))
        );
        assert_eq!(
            classify("cmd:stop\t", "CMD:"),
            ScanClassification::Rejected(RejectReason::UnknownCommand("STOP\t".to_string()))
        );
    }

    #[test]
    fn test_classify_media_keeps_original_case() {
        assert_eq!(classify("Bambi", "CMD:"), ScanClassification::MediaRequest("Bambi".to_string()));
        assert_eq!(classify("CMDPAUSE", "CMD:"), ScanClassification::MediaRequest("CMDPAUSE".to_string()));
    }

    #[test]
    fn test_debounce_window() {
        let mut debounce = DebounceState::new(Duration::from_secs(2));
        let start = Instant::now();

        assert!(debounce.accept("bambi", start));
        assert!(!debounce.accept("bambi", start + Duration::from_millis(1500)));
        assert!(debounce.accept("bambi", start + Duration::from_millis(2500)));
    }

    #[test]
    fn test_debounce_different_text_accepted_immediately() {
        let mut debounce = DebounceState::new(Duration::from_secs(2));
        let start = Instant::now();

        assert!(debounce.accept("bambi", start));
        assert!(debounce.accept("dumbo", start));
        // The last accepted text is now "dumbo"
        assert!(debounce.accept("bambi", start));
    }

    #[tokio::test]
    async fn test_volume_command_uses_configured_step() {
        let stub = StubMpv::success().await;
        let config = PlayerConfig {
            volume_step: 7,
            ..PlayerConfig::default()
        };
        let (session, _) = session_for(&stub, config);
        let mut router = ScanRouter::new(&session);

        router.route("cmd:volup").await;
        router.route("CMD:VOLDOWN").await;

        assert_eq!(stub.commands(), vec![vec!["add", "volume", "7"], vec!["add", "volume", "-7"]]);
    }

    #[tokio::test]
    async fn test_seek_commands() {
        let stub = StubMpv::success().await;
        let (session, _) = session_for(&stub, PlayerConfig::default());
        let mut router = ScanRouter::new(&session);

        router.route("CMD:FWD").await;
        router.route("CMD:RWD").await;

        assert_eq!(stub.commands(), vec![vec!["seek", "10", "relative"], vec!["seek", "-10", "relative"]]);
    }

    #[tokio::test]
    async fn test_unknown_and_rejected_scans_make_no_calls() {
        let stub = StubMpv::success().await;
        let (session, _) = session_for(&stub, PlayerConfig::default());
        let mut router = ScanRouter::new(&session);

        router.route("CMD:FOO").await;
        router.route("CMD: PAUSE").await;
        router.route("CMD:PAUSE/../x").await;
        router.route("   ").await;

        assert!(stub.commands().is_empty());
    }

    #[tokio::test]
    async fn test_stop_shows_idle_screen() {
        let stub = StubMpv::success().await;
        let (session, renders) = session_for(&stub, PlayerConfig::default());
        let mut router = ScanRouter::new(&session);

        router.route("CMD:STOP").await;

        assert_eq!(renders.get(), 1);
        assert_eq!(stub.commands(), vec![vec!["stop"], vec!["loadfile", "/tmp/splash.png", "replace"]]);
    }

    #[tokio::test]
    async fn test_exit_sets_shutdown_without_player_call() {
        let stub = StubMpv::success().await;
        let (session, _) = session_for(&stub, PlayerConfig::default());
        let mut router = ScanRouter::new(&session);

        router.route("cmd:exit").await;

        assert!(session.shutdown.is_set());
        assert!(stub.commands().is_empty());
    }

    #[tokio::test]
    async fn test_media_scan_loads_matching_file() {
        let media = tempfile::tempdir().unwrap();
        std::fs::write(media.path().join("Bambi.mp4"), "").unwrap();

        let stub = StubMpv::success().await;
        let config = PlayerConfig {
            media_dir: media.path().to_path_buf(),
            ..PlayerConfig::default()
        };
        let (session, _) = session_for(&stub, config);
        let mut router = ScanRouter::new(&session);

        router.route("bambi").await;
        router.route("nemo").await;

        let expected = media.path().join("Bambi.mp4").to_string_lossy().into_owned();
        assert_eq!(stub.commands(), vec![vec!["loadfile".to_string(), expected, "replace".to_string()]]);
    }

    #[tokio::test]
    async fn test_repeat_scan_debounced() {
        let stub = StubMpv::success().await;
        let (session, _) = session_for(&stub, PlayerConfig::default());
        let mut router = ScanRouter::new(&session);

        router.route("CMD:PAUSE").await;
        router.route("CMD:PAUSE").await;

        assert_eq!(stub.commands().len(), 1);
    }
}
