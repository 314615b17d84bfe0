//! Character State Definitions
//!
//! The discrete locomotion state, facing, the owned body, and the complete
//! per-character simulation record mutated once per fixed tick.

use serde::{Serialize, Deserialize};

use glam::Vec2;
use crate::core::hash::{compute_state_hash, HashInto, StateHash, StateHasher, CHARACTER_DOMAIN};
use crate::game::ability::AbilityTimers;
use crate::game::config::MovementProfile;
use crate::game::probe::ProbeDiagnostics;

// =============================================================================
// CHARACTER STATE
// =============================================================================

/// Locomotion state. Exactly one is active per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum CharacterState {
    /// Standing still on the ground
    #[default]
    Idle = 0,
    /// Moving on the ground
    Walking = 1,
    /// Airborne (rising or falling)
    Jumping = 2,
    /// Fixed-duration dash override
    Dashing = 3,
    /// Holding onto a wall while airborne
    WallCling = 4,
    /// Terminal
    Death = 5,
}

impl CharacterState {
    /// Grounded states (`Idle`, `Walking`).
    #[inline]
    pub fn is_grounded(self) -> bool {
        matches!(self, CharacterState::Idle | CharacterState::Walking)
    }

    /// Whether the state ignores every further transition.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == CharacterState::Death
    }
}

// =============================================================================
// FACING DIRECTION
// =============================================================================

/// Last nonzero horizontal input direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum FacingDirection {
    /// Facing -X
    Left = 0,
    /// Facing +X
    #[default]
    Right = 1,
}

impl FacingDirection {
    /// Signed unit scalar for impulse math: -1 or +1.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            FacingDirection::Left => -1.0,
            FacingDirection::Right => 1.0,
        }
    }

    /// Facing for a horizontal axis value. `None` for zero input.
    #[inline]
    pub fn from_axis(axis_x: f32) -> Option<FacingDirection> {
        if axis_x > 0.0 {
            Some(FacingDirection::Right)
        } else if axis_x < 0.0 {
            Some(FacingDirection::Left)
        } else {
            None
        }
    }
}

// =============================================================================
// BODY
// =============================================================================

/// Committed kinematic state of the external physical body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position
    pub position: Vec2,
    /// Velocity (the MotionVector)
    pub velocity: Vec2,
}

impl Body {
    /// Body at rest at `position`.
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }
}

// =============================================================================
// CHARACTER SIM
// =============================================================================

/// Everything one character's simulation owns between ticks.
///
/// Only the tick orchestrator mutates this, once per fixed step.
#[derive(Clone, Debug)]
pub struct CharacterSim {
    /// Validated movement constants
    pub(crate) profile: MovementProfile,

    /// Ticks simulated so far
    pub(crate) tick: u64,

    /// State committed by the last tick
    pub(crate) state: CharacterState,

    /// State committed by the tick before that
    pub(crate) previous_state: CharacterState,

    /// Facing direction
    pub(crate) facing: FacingDirection,

    /// Position and velocity
    pub(crate) body: Body,

    /// Coyote, dash clock, dash availability
    pub(crate) timers: AbilityTimers,

    /// Direction captured on dash entry
    pub(crate) dash_direction: Vec2,

    /// Most recent negative vertical velocity (0 if none since landing)
    pub(crate) last_falling_speed: f32,

    /// Rate limiting for unanswerable probe warnings
    pub(crate) probe_diagnostics: ProbeDiagnostics,
}

impl CharacterSim {
    /// Initialize a character at rest at `spawn`.
    pub fn new(profile: MovementProfile, spawn: Vec2) -> Self {
        Self {
            profile,
            tick: 0,
            state: CharacterState::Idle,
            previous_state: CharacterState::Idle,
            facing: FacingDirection::Right,
            body: Body::at(spawn),
            timers: AbilityTimers::default(),
            dash_direction: Vec2::ZERO,
            last_falling_speed: 0.0,
            probe_diagnostics: ProbeDiagnostics::default(),
        }
    }

    /// Respawn: re-initialize everything except the profile.
    pub fn reset(&mut self, spawn: Vec2) {
        let profile = self.profile.clone();
        *self = Self::new(profile, spawn);
    }

    /// Movement constants.
    #[inline]
    pub fn profile(&self) -> &MovementProfile {
        &self.profile
    }

    /// Ticks simulated so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> CharacterState {
        self.state
    }

    /// State before the last transition.
    #[inline]
    pub fn previous_state(&self) -> CharacterState {
        self.previous_state
    }

    /// Current facing direction.
    #[inline]
    pub fn facing(&self) -> FacingDirection {
        self.facing
    }

    /// Committed body.
    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Body access for the external collision world to push out of solids.
    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Ability timers.
    #[inline]
    pub fn timers(&self) -> &AbilityTimers {
        &self.timers
    }

    /// Direction of the current (or last) dash.
    #[inline]
    pub fn dash_direction(&self) -> Vec2 {
        self.dash_direction
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(CHARACTER_DOMAIN, self.tick, |hasher| {
            hasher
                .write(&self.state)
                .write(&self.previous_state)
                .write(&self.facing)
                .write(&self.body.position)
                .write(&self.body.velocity)
                .write(&self.timers)
                .write(&self.dash_direction)
                .write(&self.last_falling_speed);
        })
    }
}

impl HashInto for CharacterState {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&(*self as u8));
    }
}

impl HashInto for FacingDirection {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&(*self as u8));
    }
}

// =============================================================================
// TESTS
// =============================================================================
