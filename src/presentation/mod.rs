//! Presentation Consumers
//!
//! Read-only consumers of committed tick output. They may run at any
//! cadence and never write back into the simulation.
//!
//! - `animation`: Clip selection and sprite mirroring
//! - `camera`: Landing shake countdown

pub mod animation;
pub mod camera;

pub use animation::{AnimationClip, AnimationDriver, ClipChange};
pub use camera::CameraShake;
