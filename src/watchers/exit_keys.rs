//! Exit-key monitor
//!
//! Watches every physical keyboard other than the scanner for Q or Esc, reading
//! evdev directly so no window focus is needed. Keyboards are not grabbed.

use evdev::EventStream;
use futures::future::select_all;
use std::io;
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::constants::input;
use crate::input::decoder::{KeyDirection, ScanEvent};
use crate::input::device_detection::{self, InputDevice};
use crate::input::scanner::EventSource;
use crate::session::ShutdownFlag;

/// Why a keyboard watch round ended
#[derive(Debug)]
pub enum KeyboardEnd {
    ExitKey { device: String },
    Failed { device: String, error: io::Error },
}

fn is_exit_press(event: &ScanEvent) -> bool {
    event.direction == KeyDirection::Down && input::EXIT_KEYS.contains(&event.key.code())
}

async fn watch_keyboard<S: EventSource>(device: String, mut source: S) -> KeyboardEnd {
    loop {
        match source.next_event().await {
            Ok(event) => {
                if ScanEvent::from_input_event(&event).is_some_and(|e| is_exit_press(&e)) {
                    return KeyboardEnd::ExitKey { device };
                }
            }
            Err(error) => return KeyboardEnd::Failed { device, error },
        }
    }
}

/// Watch all keyboards at once; the first to press an exit key or fail ends the round
pub async fn watch_keyboards<S: EventSource>(keyboards: Vec<(String, S)>) -> Option<KeyboardEnd> {
    if keyboards.is_empty() {
        return None;
    }
    let watches = keyboards
        .into_iter()
        .map(|(device, source)| Box::pin(watch_keyboard(device, source)));
    let (end, _, _) = select_all(watches).await;
    Some(end)
}

fn open_keyboards(scanner_fragment: &str) -> Vec<(String, EventStream)> {
    let devices = match device_detection::enumerate_input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            debug!(error = %e, "Input device enumeration failed");
            return Vec::new();
        }
    };

    device_detection::select_exit_keyboards(devices, scanner_fragment, input::KEY_Q)
        .into_iter()
        .filter_map(|keyboard| {
            let name = keyboard.name().to_string();
            let path = keyboard.path().to_path_buf();
            match keyboard.into_device().into_event_stream() {
                Ok(stream) => Some((name, stream)),
                Err(e) => {
                    warn!(device_path = %path.display(), error = %e, "Cannot watch keyboard");
                    None
                }
            }
        })
        .collect()
}

pub async fn watch_exit_keys(config: &PlayerConfig, shutdown: &ShutdownFlag) {
    let rescan = config.exit_key_rescan();

    while !shutdown.is_set() {
        let keyboards = open_keyboards(&config.scanner_device_name);
        if !keyboards.is_empty() {
            info!(count = keyboards.len(), "Watching keyboards for Q/Esc exit");
        }

        match watch_keyboards(keyboards).await {
            Some(KeyboardEnd::ExitKey { device }) => {
                info!(device = %device, "Exit key pressed");
                shutdown.trigger("exit key pressed");
                return;
            }
            Some(KeyboardEnd::Failed { device, error }) => {
                debug!(device = %device, error = %error, "Keyboard disconnected, will rescan");
            }
            None => {}
        }

        tokio::time::sleep(rescan).await;
    }
}
