//! Locomotion Simulation Module
//!
//! All per-character simulation code. Deterministic for a fixed step.
//!
//! ## Module Structure
//!
//! - `config`: Tunable parameters and derived constants
//! - `input`: Input samples and delta-compressed recordings
//! - `probe`: Ground/wall contact queries and a small AABB world
//! - `state`: Character state, facing, body
//! - `ability`: Coyote window and dash timers
//! - `machine`: Pure state transition function
//! - `physics`: Velocity integration
//! - `tick`: Fixed-step orchestrator and replay
//! - `events`: Change events for presentation and replay logs

pub mod config;
pub mod input;
pub mod probe;
pub mod state;
pub mod ability;
pub mod machine;
pub mod physics;
pub mod tick;
pub mod events;

// Re-export key types
pub use config::{ConfigError, MovementProfile, PresentationConfig, ProbeShape, TunableParameters};
pub use input::{InputDelta, InputRecording, InputSample};
pub use probe::{Aabb, ContactProbe, ContactSample, NoContact, ProbeWorld, StaticContacts};
pub use state::{Body, CharacterSim, CharacterState, FacingDirection};
pub use tick::{tick, TickResult};
pub use events::{EventData, LocomotionEvent};
