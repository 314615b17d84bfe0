//! # Platformer Locomotion
//!
//! Deterministic fixed-step locomotion for a 2D platforming character.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PLATFORMER LOCOMOTION                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── config.rs   - Tunable parameters, derived constants     │
//! │  ├── input.rs    - Input samples and recordings              │
//! │  ├── probe.rs    - Ground/wall contact queries               │
//! │  ├── ability.rs  - Coyote and dash timers                    │
//! │  ├── machine.rs  - State transition function                 │
//! │  ├── physics.rs  - Velocity integration                      │
//! │  └── tick.rs     - Fixed-step orchestrator and replay        │
//! │                                                              │
//! │  presentation/   - Read-only consumers                       │
//! │  ├── animation.rs- Clip selection, sprite mirroring          │
//! │  └── camera.rs   - Landing shake                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same profile, step size, probe answers and inputs, `tick`
//! produces bit-identical state on the same platform:
//! - No system time or thread scheduling inside a tick
//! - Floats combined in a fixed order every tick
//! - All presentation randomness from seeded Xorshift128+
//!
//! Replays are verified by comparing SHA-256 state hashes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod presentation;

// Re-export commonly used types
pub use glam::Vec2;
pub use core::rng::DeterministicRng;
pub use game::config::{MovementProfile, TunableParameters};
pub use game::input::{InputRecording, InputSample};
pub use game::state::{CharacterSim, CharacterState, FacingDirection};
pub use game::tick::{tick, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 50;

/// Seconds per tick at `TICK_RATE`
pub const FIXED_DELTA: f32 = 1.0 / TICK_RATE as f32;
