//! Scan input: scanner device handling and the keyboard test path

pub mod decoder;
pub mod device_detection;
pub mod keymap;
pub mod scanner;
pub mod stdin;

/// Consumer of completed scan lines
pub trait ScanHandler {
    fn handle_scan(&mut self, text: String) -> impl Future<Output = ()>;
}
