//! mpv integration: JSON IPC client and process lifecycle

pub mod client;
pub mod process;

pub use client::MpvClient;
pub use process::MpvProcess;
