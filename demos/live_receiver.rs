//! Live pose receiver
//!
//! Mirrors a remote skeleton at 60Hz, logs the fastest joint once a second,
//! and optionally records what it receives.
//!
//! ```text
//! cargo run --example live_receiver -- [config.yaml] [record-seconds]
//! ```

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posecast::{Posecast, PosecastConfig, RecordingEngine, Sampler, SkeletonState, VelocityTracker};

const TICK_HZ: f32 = 60.0;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => PosecastConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => PosecastConfig::default(),
    };
    let record_seconds: Option<f32> = args.next().map(|s| s.parse()).transpose().context("record-seconds")?;

    let ingestor = Posecast::listen_with(&config.ingest).await?;
    let mut sampler = Sampler::new(ingestor.mailbox());
    let mut skeleton = SkeletonState::full();
    let mut velocity = VelocityTracker::new();

    let mut recorder = RecordingEngine::new();
    let clip_name = RecordingEngine::default_clip_name();
    if record_seconds.is_some() {
        recorder.start(config.recording.frame_rate, clip_name.clone())?;
    }

    let dt = 1.0 / TICK_HZ;
    let mut ticker = tokio::time::interval(Duration::from_secs_f32(dt));
    let mut elapsed = 0.0f32;
    let mut next_report = 1.0f32;

    loop {
        ticker.tick().await;
        elapsed += dt;

        if sampler.tick(&mut skeleton) {
            velocity.update(dt, &skeleton);
        }
        recorder.update(dt, &skeleton);

        if elapsed >= next_report {
            next_report += 1.0;
            let stats = ingestor.stats();
            match velocity.fastest() {
                Some((joint, speed)) => info!(%joint, speed, ?stats, "Fastest joint"),
                None => info!(?stats, "Waiting for motion"),
            }
        }

        if record_seconds.is_some_and(|limit| elapsed >= limit) {
            let path = config.recording.clip_path(&clip_name);
            let clip = recorder.stop(&path)?;
            info!(frames = clip.total_frames(), "Recording written to {}", path.display());
            break;
        }
    }

    ingestor.stop().await;
    Ok(())
}
