//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Input event constants (from evdev / Linux input-event-codes.h)
pub mod input {
    /// Key release event value
    pub const KEY_RELEASE: i32 = 0;

    /// Key press event value
    pub const KEY_PRESS: i32 = 1;

    /// Key auto-repeat (hold) event value
    pub const KEY_REPEAT: i32 = 2;

    /// Key code for Escape
    pub const KEY_ESC: u16 = 1;

    /// Key code for Q - also used to identify real keyboards
    pub const KEY_Q: u16 = 16;

    /// Key code for Enter, terminates a scanned line
    pub const KEY_ENTER: u16 = 28;

    /// Key code for Left Shift key
    pub const KEY_LEFTSHIFT: u16 = 42;

    /// Key code for Right Shift key
    pub const KEY_RIGHTSHIFT: u16 = 54;

    /// Keys that end the session when pressed on a physical keyboard
    pub const EXIT_KEYS: &[u16] = &[KEY_Q, KEY_ESC];
}

/// System paths
pub mod paths {
    /// Input device directory
    pub const DEV_INPUT: &str = "/dev/input";
}

/// User group permissions
pub mod permissions {
    /// Linux group name for input device access
    pub const INPUT_GROUP: &str = "input";

    /// Command to add user to input group
    pub const ADD_TO_INPUT_GROUP: &str = "sudo usermod -a -G input $USER";
}

/// Configuration paths and filenames
pub mod config {
    /// Application directory name under XDG config
    pub const APP_DIR: &str = "kids-qr-player";

    /// Configuration filename
    pub const FILENAME: &str = "config.json";

    /// Environment variable overriding the configuration directory
    pub const DIR_ENV_VAR: &str = "KIDS_QR_PLAYER_CONFIG_DIR";
}

/// mpv process and JSON IPC constants
pub mod mpv {
    /// Field value mpv uses to report a successful command
    pub const SUCCESS: &str = "success";

    /// Property that is `true` while no file is loaded
    pub const IDLE_PROPERTY: &str = "idle-active";

    /// Fixed arguments passed to every mpv launch (socket and input conf are appended)
    pub const BASE_ARGS: &[&str] = &[
        "--idle=yes",
        "--force-window=yes",
        "--fullscreen=yes",
        "--image-display-duration=inf",
        "--no-input-default-bindings",
        "--no-osc",
        "--cursor-autohide=always",
        "--hwdec=auto",
        "--no-terminal",
        "--really-quiet",
    ];
}

/// Scan command vocabulary
pub mod commands {
    pub const PAUSE: &str = "PAUSE";
    pub const STOP: &str = "STOP";
    pub const VOLUP: &str = "VOLUP";
    pub const VOLDOWN: &str = "VOLDOWN";
    pub const MUTE: &str = "MUTE";
    pub const FWD: &str = "FWD";
    pub const RWD: &str = "RWD";
    pub const EXIT: &str = "EXIT";
}

/// Idle screen (splash) rendering constants
pub mod splash {
    /// Output image width in pixels
    pub const WIDTH: u32 = 1920;

    /// Output image height in pixels
    pub const HEIGHT: u32 = 1080;

    /// Output filename inside the assets directory
    pub const FILENAME: &str = "splash.png";

    /// Maximum horizontal burn-in offset in pixels
    pub const JITTER_X: i32 = 150;

    /// Maximum vertical burn-in offset in pixels
    pub const JITTER_Y: i32 = 100;

    pub const CLOCK_SIZE: f32 = 200.0;
    pub const TITLE_SIZE: f32 = 80.0;
    pub const SUBTITLE_SIZE: f32 = 36.0;

    pub const CLOCK_Y: i32 = 220;
    pub const TITLE_Y: i32 = 500;
    pub const SUBTITLE_GAP: i32 = 110;

    pub const TITLE: &str = "Scan a code to watch!";
    pub const SUBTITLE: &str = "Find a show in your book and scan the QR code";

    /// Preferred bold fonts for the clock and title (tried in order)
    pub const BOLD_FONT_CANDIDATES: &[&str] = &["DejaVu Sans Bold", "Liberation Sans Bold", "Noto Sans Bold"];

    /// Preferred regular fonts for the subtitle (tried in order)
    pub const REGULAR_FONT_CANDIDATES: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans"];
}

/// Default configuration values
/// These are used when the config file is missing or omits a field
pub mod defaults {
    /// Filesystem locations
    pub mod paths {
        /// Directory holding playable videos (relative to the working directory)
        pub const MEDIA_DIR: &str = "media";

        /// Directory holding generated assets such as the idle screen
        pub const ASSETS_DIR: &str = "assets";

        /// mpv JSON IPC socket
        pub const MPV_SOCKET: &str = "/tmp/kids-mpv-socket";

        /// mpv executable (resolved through PATH)
        pub const MPV_BINARY: &str = "mpv";
    }

    /// Scan interpretation
    pub mod scan {
        /// Prefix marking a command QR code
        pub const COMMAND_PREFIX: &str = "CMD:";

        /// Playable video extensions (lowercase, without dot)
        pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "webm", "mov", "m4v", "ts", "flv"];

        /// Identical scans inside this window are ignored
        pub const DEBOUNCE_MS: u64 = 2000;

        /// Volume change per VOLUP/VOLDOWN, in percent
        pub const VOLUME_STEP: i32 = 5;

        /// Seek distance per FWD/RWD, in seconds
        pub const SEEK_STEP_SECONDS: i32 = 10;

        /// Substring identifying the scanner among input device names
        pub const SCANNER_DEVICE_NAME: &str = "SCANNER";
    }

    /// Poll intervals, backoffs and timeouts
    pub mod timing {
        pub const SCANNER_RECONNECT_MS: u64 = 3000;
        pub const IDLE_POLL_MS: u64 = 1000;
        pub const LIVENESS_POLL_MS: u64 = 500;
        pub const EXIT_KEY_RESCAN_MS: u64 = 3000;
        pub const SHUTDOWN_POLL_MS: u64 = 500;
        pub const SOCKET_WAIT_ATTEMPTS: u32 = 20;
        pub const SOCKET_WAIT_INTERVAL_MS: u64 = 250;
        pub const IPC_TIMEOUT_MS: u64 = 2000;
        pub const TERMINATE_GRACE_MS: u64 = 5000;
    }
}
