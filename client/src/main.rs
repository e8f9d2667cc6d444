mod ball;
mod collision;
mod feedback;
mod game;
mod handshake;
mod rpc;
mod scene;
mod store;
mod sync;
mod tracking;

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use glam::Vec3;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::DeviceClass;

use crate::feedback::TracingFeedback;
use crate::game::{FramePhase, Game};
use crate::handshake::HandshakeConfig;
use crate::rpc::RpcClient;
use crate::store::RemoteStore;
use crate::tracking::{FixedTracking, OrbitTracking};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceArg {
    Primary,
    Secondary,
}

impl From<DeviceArg> for DeviceClass {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Primary => DeviceClass::Primary,
            DeviceArg::Secondary => DeviceClass::Secondary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Paddle-ball game client")]
struct Args {
    /// Relay address
    #[arg(short, long, default_value_t = format!("{}:{}", shared::RELAY_HOST, shared::RELAY_PORT))]
    relay: String,

    /// Which physical tracking rig this client drives
    #[arg(short, long, value_enum)]
    device: DeviceArg,

    /// Exchange state with the relay every Kth frame
    #[arg(long, default_value_t = shared::SYNC_INTERVAL)]
    sync_interval: u64,

    /// Socket timeout per remote call, in milliseconds
    #[arg(long, default_value_t = 50)]
    rpc_timeout_ms: u64,

    /// Give up on the readiness handshake after this many seconds
    #[arg(long, default_value_t = 30)]
    handshake_ceiling_secs: u64,

    /// Frame cadence
    #[arg(long, default_value_t = 90)]
    fps: u32,

    /// Stop after this many frames (runs until killed if omitted)
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client=info".into()),
        )
        .init();

    let args = Args::parse();
    let device: DeviceClass = args.device.into();
    let timeout = Duration::from_millis(args.rpc_timeout_ms);

    tracing::info!(?device, relay = %args.relay, "Connecting to relay");
    let rpc = RpcClient::connect(&args.relay, timeout)
        .with_context(|| format!("connecting to relay at {}", args.relay))?;
    let store = RemoteStore::new(rpc);

    let handshake_config = HandshakeConfig {
        ceiling: Duration::from_secs(args.handshake_ceiling_secs),
        ..Default::default()
    };

    // Stand-in tracking: a steady head a step back from the arena center
    // and a paddle sweeping an arc in front of it.
    let head = Box::new(FixedTracking(shared::Pose::new(
        Vec3::new(0.0, 0.2, 2.5),
        glam::Quat::IDENTITY,
    )));
    let paddle = Box::new(OrbitTracking::new(Vec3::new(0.0, 0.0, 2.0), 0.5, 1.2));

    let mut game = Game::new(
        device,
        store,
        args.sync_interval,
        handshake_config,
        head,
        paddle,
        Box::new(TracingFeedback),
    )?;

    let frame_budget = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut last_frame = Instant::now();
    let mut frame: u64 = 0;

    loop {
        let now = Instant::now();
        let delta_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        match game.frame(delta_time)? {
            FramePhase::Waiting => {
                tracing::trace!("Waiting for peer");
            }
            FramePhase::Playing => {
                let center = game.ball().centroid();
                let paddle = game.local().paddle.pose.position;
                let peer = game.remote().paddle.pose.position;
                tracing::trace!(?center, ?paddle, ?peer, "Frame state");
            }
        }

        frame += 1;
        if let Some(limit) = args.frames {
            if frame >= limit {
                tracing::info!(frames = frame, "Frame limit reached, exiting");
                return Ok(());
            }
        }

        // Hold the cadence; oversleeping just stretches delta time.
        let elapsed = now.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }
}
