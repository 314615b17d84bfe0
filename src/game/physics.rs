//! Physics Integrator
//!
//! Computes the next velocity under the state the machine just selected.
//! Nothing here mutates the character; the orchestrator commits the output.

use glam::Vec2;
use crate::game::ability::AbilityTimers;
use crate::game::config::MovementProfile;
use crate::game::input::InputSample;
use crate::game::machine::Observation;
use crate::game::state::{CharacterState, FacingDirection};

/// Everything one integration step reads.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsStep<'a> {
    /// Movement constants
    pub profile: &'a MovementProfile,
    /// State selected for this tick
    pub state: CharacterState,
    /// Start-of-tick observation
    pub observation: &'a Observation,
    /// This tick's input
    pub input: &'a InputSample,
    /// Timers after this tick's refresh
    pub timers: &'a AbilityTimers,
    /// Facing before this tick
    pub facing: FacingDirection,
    /// Direction captured on dash entry
    pub dash_direction: Vec2,
    /// Seconds per tick
    pub fixed_delta: f32,
}

/// One-shot velocity override applied this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Impulse {
    /// Ground or coyote jump. `coyote` is true when airborne at the press.
    Jump {
        /// Launched from the forgiveness window
        coyote: bool,
    },
    /// Launch away from a clung wall
    WallJump,
}

/// Result of one integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsOutput {
    /// Velocity to commit
    pub velocity: Vec2,
    /// Facing to commit
    pub facing: FacingDirection,
    /// Incoming `vy` if it was negative, captured before landing zeroes it
    pub falling_speed: Option<f32>,
    /// Impulse applied this tick, if any
    pub impulse: Option<Impulse>,
}

/// Integrate one tick.
pub fn integrate(velocity: Vec2, step: &PhysicsStep<'_>) -> PhysicsOutput {
    let profile = step.profile;
    let dt = step.fixed_delta;

    let falling_speed = (velocity.y < 0.0).then_some(velocity.y);

    if step.state == CharacterState::Dashing {
        return PhysicsOutput {
            velocity: step.dash_direction * profile.dash_speed(),
            facing: step.facing,
            falling_speed,
            impulse: None,
        };
    }

    let dead = step.state == CharacterState::Death;
    let axis_x = if dead { 0.0 } else { step.input.axis_x() };

    let mut vx = integrate_horizontal(
        velocity.x,
        axis_x,
        profile.acceleration(),
        profile.max_speed(),
        dt,
    );

    let mut vy = if step.state == CharacterState::WallCling {
        -profile.params().wall_slide_speed
    } else if step.observation.grounded {
        velocity.y.max(0.0)
    } else {
        integrate_vertical(velocity.y, profile.gravity(), profile.terminal_velocity(), dt)
    };

    let mut impulse = None;

    if step.input.jump_pressed() {
        match step.state {
            CharacterState::WallCling => {
                let max_speed = profile.max_speed();
                let launch = profile.jump_velocity() * -step.facing.sign();
                vx = launch.clamp(-max_speed, max_speed);
                vy = profile.jump_velocity();
                impulse = Some(Impulse::WallJump);
            }
            CharacterState::Idle | CharacterState::Walking | CharacterState::Jumping => {
                let grounded = step.observation.grounded;
                if grounded || step.timers.coyote_available(profile.coyote_time()) {
                    vy = profile.jump_velocity();
                    impulse = Some(Impulse::Jump { coyote: !grounded });
                }
            }
            CharacterState::Dashing | CharacterState::Death => {}
        }
    }

    if step.input.jump_released() && vy > 0.0 && !dead {
        vy *= 0.5;
    }

    PhysicsOutput {
        velocity: Vec2::new(vx, vy),
        facing: next_facing(step, axis_x),
        falling_speed,
        impulse,
    }
}

/// Horizontal velocity update.
///
/// With input, accelerate and clamp to `±max_speed`. Without, snap to rest
/// once inside `2 * acceleration * dt`, otherwise brake by one step.
pub fn integrate_horizontal(vx: f32, axis_x: f32, acceleration: f32, max_speed: f32, dt: f32) -> f32 {
    let step = acceleration * dt;

    if axis_x == 0.0 {
        if vx.abs() < step * 2.0 {
            0.0
        } else {
            (vx - vx.signum() * step).clamp(-max_speed, max_speed)
        }
    } else {
        (vx + axis_x * step).clamp(-max_speed, max_speed)
    }
}

/// Gravity with a terminal velocity floor. No upper bound.
#[inline]
pub fn integrate_vertical(vy: f32, gravity: f32, terminal_velocity: f32, dt: f32) -> f32 {
    (vy + gravity * dt).max(-terminal_velocity)
}

// Frozen on every dash, cling and death tick, entry tick included.
fn next_facing(step: &PhysicsStep<'_>, axis_x: f32) -> FacingDirection {
    match step.state {
        CharacterState::Dashing | CharacterState::WallCling | CharacterState::Death => step.facing,
        _ => FacingDirection::from_axis(axis_x).unwrap_or(step.facing),
    }
}

// =============================================================================
// TESTS
// =============================================================================
