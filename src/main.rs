#![deny(unsafe_code)]

mod config;
mod constants;
mod input;
mod library;
mod mpv;
mod orchestrator;
mod router;
mod session;
mod splash;
mod watchers;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::PlayerConfig;
use input::device_detection;
use orchestrator::InputMode;

#[derive(Parser)]
#[command(name = "kids-qr-player")]
#[command(version)]
#[command(about = "Scan a QR code, watch a video: kiosk player driving mpv", long_about = None)]
struct Cli {
    /// Read scans as lines from stdin instead of the USB scanner (for testing)
    #[arg(long)]
    keyboard: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the videos; overrides the config file
    #[arg(long, value_name = "PATH")]
    media_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set
    let level = if cli.debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let mut config = match &cli.config {
        Some(path) => PlayerConfig::load_from(path)?,
        None => PlayerConfig::load()?,
    };
    if let Some(media_dir) = cli.media_dir {
        config.media_dir = media_dir;
    }

    let mode = if cli.keyboard {
        InputMode::Keyboard
    } else {
        if !device_detection::check_permissions() {
            device_detection::print_permission_error();
        }
        device_detection::log_attached_devices(&config.scanner_device_name);
        InputMode::Scanner
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    rt.block_on(orchestrator::run(config, mode))
}
