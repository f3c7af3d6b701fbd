//! Clip sender
//!
//! Streams a recorded clip to a receiver at the clip's frame rate.
//!
//! ```text
//! cargo run --example clip_sender -- <clip.yaml> [host:port] [--loop]
//! ```

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posecast::provider::PoseProvider;
use posecast::providers::ClipProvider;
use posecast::{Clip, DEFAULT_PORT, PoseSender};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(clip_path) = args.first() else {
        bail!("usage: clip_sender <clip.yaml> [host:port] [--loop]");
    };
    let target: SocketAddr = match args.get(1).filter(|a| !a.starts_with("--")) {
        Some(addr) => addr.parse().with_context(|| format!("invalid target address {}", addr))?,
        None => SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
    };
    let looping = args.iter().any(|a| a == "--loop");

    let clip = Clip::load(clip_path)?;
    let mut provider = ClipProvider::new(clip)?.looping(looping);
    let mut sender = PoseSender::connect(target).await?;

    while let Some(snapshot) = provider.next_snapshot().await? {
        sender.send(&snapshot).await?;
    }

    info!(sent = sender.sent(), "Clip finished");
    Ok(())
}
