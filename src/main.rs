//! Locomotion Simulator
//!
//! Drives one character through a scripted run on a small test level,
//! then replays the recording and checks the state hashes match.
//!
//! Usage: `locomotion-sim [--verbose] [params.json]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use locomotion::{
    FIXED_DELTA, TICK_RATE, VERSION,
    Vec2,
    game::{
        config::{MovementProfile, PresentationConfig},
        events::EventData,
        input::{InputRecording, InputSample},
        probe::{Aabb, ProbeWorld},
        state::CharacterSim,
        tick::{replay_with, tick},
    },
    presentation::{AnimationDriver, CameraShake},
};

/// Half size of the character's collision box
const BODY_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 0.5);

/// Ticks in the scripted run
const DEMO_TICKS: u64 = 250;

const HEALTH: i32 = 100;

/// Scripted locomotion run with replay verification
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file of tunable parameters (defaults when omitted)
    config: Option<PathBuf>,

    /// Log every transition and impact
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Locomotion Simulator v{}", VERSION);
    info!("Tick Rate: {} Hz ({}s per tick)", TICK_RATE, FIXED_DELTA);

    let profile = match &args.config {
        Some(path) => MovementProfile::load(path)
            .with_context(|| format!("Failed to load movement profile from {}", path.display()))?,
        None => MovementProfile::default(),
    };
    info!(
        "Profile: accel {:.2}, gravity {:.2}, jump {:.2}, dash time {:.3}s",
        profile.acceleration(),
        profile.gravity(),
        profile.jump_velocity(),
        profile.dash_time()
    );

    demo_run(&profile)
}

/// Floor from x=-20 to 20 with its top at y=0, and a wall face at x=8.
fn demo_level() -> ProbeWorld {
    ProbeWorld::new()
        .with_solid(Aabb::from_min_max(Vec2::new(-20.0, -1.0), Vec2::new(20.0, 0.0)))
        .with_solid(Aabb::from_min_max(Vec2::new(8.0, 0.0), Vec2::new(9.0, 12.0)))
}

/// Walk right, jump toward the wall, cling, wall-jump off, dash back, land.
fn scripted_input(t: u64) -> InputSample {
    match t {
        0..=39 => InputSample::with_axes(1.0, 0.0),
        40 => InputSample::with_axes(1.0, 0.0).jump(),
        41..=89 => InputSample::with_axes(1.0, 0.0),
        90 => InputSample::with_axes(1.0, 0.0).jump(),
        91..=99 => InputSample::with_axes(-1.0, 0.0),
        100 => InputSample::with_axes(-1.0, 0.0).release_jump(),
        101..=109 => InputSample::with_axes(-1.0, 0.0),
        110 => InputSample::with_axes(-1.0, 0.0).dash(),
        _ => InputSample::new(),
    }
}

fn demo_run(profile: &MovementProfile) -> Result<()> {
    info!("=== Starting Demo Run ===");

    let world = demo_level();
    let spawn = Vec2::new(0.0, BODY_HALF_EXTENTS.y);
    let mut sim = CharacterSim::new(profile.clone(), spawn);
    let mut recording = InputRecording::new();
    let presentation = PresentationConfig::default();
    let mut animation = AnimationDriver::new(&presentation);
    let mut camera = CameraShake::new(presentation, 0x5eed);

    let mut total_events = 0;

    for t in 0..DEMO_TICKS {
        let input = scripted_input(t);
        recording.record(t, input);

        let result = tick(&mut sim, FIXED_DELTA, &input, &world, HEALTH);
        world.resolve_body(sim.body_mut(), BODY_HALF_EXTENTS);
        total_events += result.events.len();

        if let Some(change) = animation.observe(&result) {
            info!(
                "Tick {}: fade to \"{}\" over {}s (flip_x = {})",
                t,
                change.clip.id(),
                change.crossfade,
                animation.flip_x()
            );
        }
        camera.observe(&result);
        let shake = camera.update(FIXED_DELTA);
        if shake != Vec2::ZERO {
            info!("Tick {}: camera shake {}", t, shake);
        }

        // Log important events
        for event in &result.events {
            match &event.data {
                EventData::Jumped { coyote: true } => info!("Tick {}: coyote jump", t),
                EventData::WallJumped => info!("Tick {}: wall jump", t),
                EventData::DashStarted { direction } => info!("Tick {}: dash toward {}", t, direction),
                EventData::GroundImpact { speed } => info!("Tick {}: landed at {:.2}", t, speed),
                _ => {}
            }
        }
    }
    recording.finalize(DEMO_TICKS - 1);

    // Print final results
    info!("=== Run Results ===");
    let body = sim.body();
    info!("Final state: {:?} facing {:?}", sim.state(), sim.facing());
    info!("Final position: {}", body.position);
    let hash = sim.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {} ({} input deltas)", total_events, recording.delta_count());
    info!("Recording Hash: {}", hex::encode(recording.compute_hash()));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay_with(
        profile,
        spawn,
        &recording,
        &world,
        FIXED_DELTA,
        HEALTH,
        |body| world.resolve_body(body, BODY_HALF_EXTENTS),
    );
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        warn!("DETERMINISM FAILURE: Hashes differ!");
        bail!("replay diverged from live run");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");

    Ok(())
}
