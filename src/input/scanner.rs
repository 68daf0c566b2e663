//! Scanner input source
//!
//! Finds the barcode/QR scanner among the attached input devices, grabs it
//! exclusively so scans never leak into the window system, and feeds its
//! events through the [`KeycodeDecoder`]. Any disconnect sends the loop back
//! to searching after the reconnect interval.

use evdev::{EventStream, InputEvent};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::input::ScanHandler;
use crate::input::decoder::{KeycodeDecoder, ScanEvent};
use crate::input::device_detection::{self, EvdevDevice, InputDevice};

/// Source of raw input events for the read loop
pub trait EventSource {
    fn next_event(&mut self) -> impl Future<Output = io::Result<InputEvent>>;
}

impl EventSource for EventStream {
    async fn next_event(&mut self) -> io::Result<InputEvent> {
        EventStream::next_event(self).await
    }
}

/// Exclusively grabbed scanner; the grab is released when this is dropped
pub struct GrabbedScanner {
    stream: EventStream,
    path: PathBuf,
}

impl GrabbedScanner {
    /// Grab the device and switch it to async reading
    pub fn acquire(device: EvdevDevice) -> io::Result<Self> {
        let path = device.path().to_path_buf();
        let mut device = device.into_device();
        device.grab()?;
        let stream = device.into_event_stream()?;
        info!(device_path = %path.display(), "Grabbed scanner exclusively");
        Ok(Self { stream, path })
    }
}

impl EventSource for GrabbedScanner {
    async fn next_event(&mut self) -> io::Result<InputEvent> {
        self.stream.next_event().await
    }
}

impl Drop for GrabbedScanner {
    fn drop(&mut self) {
        // Best effort: a removed device cannot be ungrabbed and the fd close releases it anyway
        match self.stream.device_mut().ungrab() {
            Ok(()) => debug!(device_path = %self.path.display(), "Released scanner grab"),
            Err(e) => debug!(device_path = %self.path.display(), error = %e, "Scanner ungrab failed"),
        }
    }
}

enum ScannerState {
    Searching,
    Acquiring(EvdevDevice),
    Reading(GrabbedScanner),
}

/// Read scans forever, handing each completed line to `handler`.
///
/// Never returns on its own; the caller stops polling it at shutdown, which drops
/// the grabbed device and releases it.
pub async fn read_scans<H: ScanHandler>(config: &PlayerConfig, handler: &mut H) {
    let reconnect = config.scanner_reconnect();
    let mut state = ScannerState::Searching;

    loop {
        state = match state {
            ScannerState::Searching => match find_scanner(&config.scanner_device_name) {
                Some(device) => ScannerState::Acquiring(device),
                None => {
                    info!(
                        name = %config.scanner_device_name,
                        retry_secs = reconnect.as_secs_f32(),
                        "Scanner not found, retrying"
                    );
                    tokio::time::sleep(reconnect).await;
                    ScannerState::Searching
                }
            },
            ScannerState::Acquiring(device) => match GrabbedScanner::acquire(device) {
                Ok(scanner) => ScannerState::Reading(scanner),
                Err(e) => {
                    warn!(error = %e, "Could not grab scanner, retrying");
                    tokio::time::sleep(reconnect).await;
                    ScannerState::Searching
                }
            },
            ScannerState::Reading(mut scanner) => {
                let err = read_lines(&mut scanner, handler).await;
                warn!(error = %err, "Scanner disconnected, will reconnect");
                drop(scanner);
                tokio::time::sleep(reconnect).await;
                ScannerState::Searching
            }
        };
    }
}

fn find_scanner(name_fragment: &str) -> Option<EvdevDevice> {
    let devices = match device_detection::enumerate_input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            debug!(error = %e, "Input device enumeration failed");
            return None;
        }
    };

    let scanner = device_detection::select_scanner(devices, name_fragment)?;
    info!(
        name = %scanner.name(),
        device_path = %scanner.path().display(),
        "Found scanner"
    );
    Some(scanner)
}

/// Decode events into lines until the source fails; returns the failure
pub async fn read_lines<S: EventSource, H: ScanHandler>(source: &mut S, handler: &mut H) -> io::Error {
    let mut decoder = KeycodeDecoder::new();

    loop {
        let event = match source.next_event().await {
            Ok(event) => event,
            Err(e) => {
                if !decoder.pending().is_empty() {
                    debug!(partial = %decoder.pending(), "Discarding incomplete scan");
                }
                return e;
            }
        };

        if let Some(scan) = ScanEvent::from_input_event(&event)
            && let Some(line) = decoder.feed(scan)
        {
            info!(text = %line, "Scanned");
            handler.handle_scan(line).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use evdev::{EventType, KeyCode};
    use std::collections::VecDeque;

    /// Replays fixed events, then fails as if the device was unplugged
    pub(crate) struct ScriptedSource {
        events: VecDeque<InputEvent>,
    }

    /// Never produces an event
    pub(crate) struct SilentSource;

    impl EventSource for SilentSource {
        async fn next_event(&mut self) -> io::Result<InputEvent> {
            std::future::pending().await
        }
    }

    impl ScriptedSource {
        pub fn new(events: Vec<InputEvent>) -> Self {
            Self { events: events.into() }
        }

        pub fn typing(keys: &[KeyCode]) -> Self {
            let mut events = VecDeque::new();
            for key in keys {
                events.push_back(InputEvent::new(EventType::KEY.0, key.code(), 1));
                events.push_back(InputEvent::new(EventType::SYNCHRONIZATION.0, 0, 0));
                events.push_back(InputEvent::new(EventType::KEY.0, key.code(), 0));
            }
            Self { events }
        }
    }

    impl EventSource for ScriptedSource {
        async fn next_event(&mut self) -> io::Result<InputEvent> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "device removed"))
        }
    }

    #[derive(Default)]
    struct Collector(Vec<String>);

    impl ScanHandler for Collector {
        async fn handle_scan(&mut self, text: String) {
            self.0.push(text);
        }
    }

    #[tokio::test]
    async fn test_read_lines_delivers_each_line_then_reports_disconnect() {
        let mut source = ScriptedSource::typing(&[
            KeyCode::KEY_U,
            KeyCode::KEY_P,
            KeyCode::KEY_ENTER,
            KeyCode::KEY_1,
            KeyCode::KEY_2,
            KeyCode::KEY_ENTER,
            KeyCode::KEY_Z,
        ]);
        let mut collector = Collector::default();

        let err = read_lines(&mut source, &mut collector).await;

        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_eq!(collector.0, vec!["up".to_string(), "12".to_string()]);
    }
}
