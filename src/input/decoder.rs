//! Keycode decoder
//!
//! Assembles raw key events from a keyboard-emulating scanner into lines of text.
//! Shift state is tracked across events; everything else lives in the line buffer.

use evdev::{EventType, InputEvent, KeyCode};

use crate::constants::input;
use crate::input::keymap;

/// Direction of a single key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
    Repeat,
}

impl KeyDirection {
    fn from_value(value: i32) -> Option<Self> {
        match value {
            input::KEY_PRESS => Some(Self::Down),
            input::KEY_RELEASE => Some(Self::Up),
            input::KEY_REPEAT => Some(Self::Repeat),
            _ => None,
        }
    }
}

/// Raw key event as delivered by an input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEvent {
    pub key: KeyCode,
    pub direction: KeyDirection,
}

impl ScanEvent {
    pub fn new(key: KeyCode, direction: KeyDirection) -> Self {
        Self { key, direction }
    }

    /// Convert an evdev event, dropping anything that is not a key transition
    pub fn from_input_event(event: &InputEvent) -> Option<Self> {
        if event.event_type() != EventType::KEY {
            return None;
        }
        let direction = KeyDirection::from_value(event.value())?;
        Some(Self::new(KeyCode(event.code()), direction))
    }
}

fn is_shift(key: KeyCode) -> bool {
    key.code() == input::KEY_LEFTSHIFT || key.code() == input::KEY_RIGHTSHIFT
}

/// Line assembler for one device's event stream
#[derive(Debug, Default)]
pub struct KeycodeDecoder {
    buffer: String,
    shift: bool,
}

impl KeycodeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event, returning a completed line when Enter is pressed.
    ///
    /// Repeated key-down events for the same key append repeatedly; the scanner
    /// is expected to send clean press/release pairs.
    pub fn feed(&mut self, event: ScanEvent) -> Option<String> {
        if is_shift(event.key) {
            self.shift = matches!(event.direction, KeyDirection::Down | KeyDirection::Repeat);
            return None;
        }

        if event.direction != KeyDirection::Down {
            return None;
        }

        if event.key.code() == input::KEY_ENTER {
            let line = self.buffer.trim().to_string();
            self.buffer.clear();
            return (!line.is_empty()).then_some(line);
        }

        if let Some(ch) = keymap::char_for_key(event.key, self.shift) {
            self.buffer.push(ch);
        }
        None
    }

    /// Characters received since the last Enter
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
