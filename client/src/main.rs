use clap::Parser;
use client::config::Tuning;
use client::input::InputSource;
use client::network::{Client, ClientOptions};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server WebSocket URL
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:4242")]
    server: String,

    /// Player name (letters, digits and spaces)
    #[arg(short = 'n', long, default_value = "Rusty")]
    name: String,

    /// Room id to join; a new room is created if omitted
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// JSON file overriding the prediction and sync tuning
    #[arg(short = 't', long)]
    tuning: Option<PathBuf>,

    /// Bots to add when hosting
    #[arg(short = 'b', long, default_value = "0")]
    bots: u8,

    /// Start the match as soon as the room is ready (host only)
    #[arg(long)]
    auto_start: bool,

    /// Hold the paddle at this screen angle in radians instead of playing automatically
    #[arg(long, allow_hyphen_values = true)]
    hold_angle: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    info!("Starting client as {}...", args.name);
    if args.fake_ping > 0 {
        info!("Simulating {}ms latency", args.fake_ping);
    }

    let input = match args.hold_angle {
        Some(angle) => {
            info!("Holding the paddle at {:.2} rad", angle);
            InputSource::hold(angle)
        }
        None => InputSource::default(),
    };

    let client = Client::connect(ClientOptions {
        server_url: args.server,
        name: args.name,
        room: args.room,
        fake_ping_ms: args.fake_ping,
        bots: args.bots,
        auto_start: args.auto_start,
        input,
        tuning,
    })
    .await?;

    client.run().await?;

    Ok(())
}
