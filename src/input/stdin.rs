//! Line-oriented test input
//!
//! Lets the player run without a scanner: every line typed on stdin is handled
//! exactly like a scan. End of input ends the task.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::input::ScanHandler;
use crate::session::ShutdownFlag;

/// Read scans from the process's standard input
pub async fn read_stdin_scans<H: ScanHandler>(handler: &mut H, shutdown: &ShutdownFlag) {
    info!("Keyboard mode: type QR code text and press Enter");
    read_line_scans(BufReader::new(tokio::io::stdin()), handler, shutdown).await;
}

/// Feed trimmed, non-empty lines from `reader` to `handler` until EOF or shutdown
pub async fn read_line_scans<R, H>(reader: R, handler: &mut H, shutdown: &ShutdownFlag)
where
    R: AsyncBufRead + Unpin,
    H: ScanHandler,
{
    let mut lines = reader.lines();

    while !shutdown.is_set() {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let text = line.trim();
                if !text.is_empty() {
                    handler.handle_scan(text.to_string()).await;
                }
            }
            Ok(None) => {
                info!("Input closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read input line");
                break;
            }
        }
    }
}
