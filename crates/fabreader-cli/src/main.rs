//! FabReader device binary.
//!
//! Runs the reader's control loop on a development machine: the session core
//! talks to a real backend over WebSocket, the display is a console panel and
//! card taps and key presses are typed on stdin.

mod config;
mod console;
mod device;
mod telemetry;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use fabreader_network::{HostLink, HostLinkConfig, WebSocketConfig, WebSocketTransport};
use fabreader_session::{FileStore, Session};
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::config::DeviceConfig;
use crate::console::ConsoleDisplay;
use crate::device::Device;

#[derive(Debug, Parser)]
#[command(name = "fabreader", version, about = "FabReader NFC reader firmware")]
struct Cli {
    /// Configuration file; defaults to `config/fabreader.*` when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let config = DeviceConfig::load(cli.config.as_deref()).context("Loading configuration")?;
    if cli.print_config {
        println!("{config:#?}");
        return Ok(());
    }

    run(config).await
}

async fn run(config: DeviceConfig) -> anyhow::Result<()> {
    let url = config.backend.websocket_url();
    info!(%url, store = %config.device.store_path.display(), "Starting reader");

    let transport = WebSocketTransport::new(WebSocketConfig::new(url));
    let link = HostLink::new(HostLinkConfig::default(), transport);
    let (nfc, keypad) = console::spawn_stdin_reader();
    let store = FileStore::new(&config.device.store_path);

    let session = Session::builder(link, ConsoleDisplay::stdout(), nfc, store)
        .with_config(config.session.clone())
        .build()
        .context("Building session")?;

    let mut device = Device::new(session, keypad);
    device.setup().context("Bringing up network link")?;

    let mut ticker = tokio::time::interval(config.device.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                device.step(Instant::now());
            }
            result = &mut shutdown => {
                result.context("Waiting for shutdown signal")?;
                info!("Shutting down");
                break;
            }
        }
    }

    device.shutdown(Instant::now());
    Ok(())
}
