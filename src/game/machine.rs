//! Movement State Machine
//!
//! Pure mapping from (state, timers, observation, input, health) to the next
//! state. Timer side effects of a transition are applied by the orchestrator
//! after it observes the change, never here.

use glam::Vec2;
use crate::game::ability::AbilityTimers;
use crate::game::input::InputSample;
use crate::game::probe::ContactSample;
use crate::game::state::CharacterState;

/// What the character knows about its surroundings at the start of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Observation {
    /// Probe results for this tick
    pub contacts: ContactSample,
    /// Ground probe hit and not rising faster than the tolerance
    pub grounded: bool,
    /// `|vx|` before integration
    pub horizontal_speed: f32,
}

impl Observation {
    /// Derive the grounded test from probe results and the committed velocity.
    ///
    /// The small upward tolerance keeps "grounded" from flickering on while
    /// the body is still rising through a one-way platform after a jump.
    pub fn new(contacts: ContactSample, velocity: Vec2, ground_tolerance: f32) -> Self {
        Self {
            contacts,
            grounded: is_grounded(contacts.ground, velocity.y, ground_tolerance),
            horizontal_speed: velocity.x.abs(),
        }
    }
}

/// Ground probe hit and `vy <= tolerance`.
#[inline]
pub fn is_grounded(ground_probe: bool, vy: f32, tolerance: f32) -> bool {
    ground_probe && vy <= tolerance
}

/// Airborne and pressing into a touched wall.
#[inline]
pub fn holds_wall(observation: &Observation, input: &InputSample) -> bool {
    !observation.grounded && observation.contacts.touching_wall(input.horizontal_sign())
}

/// Evaluate the next state.
///
/// Precedence: `Death` stays `Death`; the source state's table row; an
/// explicit dash request; finally `health <= 0` overrides everything.
pub fn transition(
    state: CharacterState,
    timers: &AbilityTimers,
    observation: &Observation,
    input: &InputSample,
    health: i32,
    dash_time: f32,
) -> CharacterState {
    if state.is_terminal() {
        return state;
    }

    let mut next = table_transition(state, timers, observation, input, dash_time);

    if input.dash_pressed() && timers.can_dash && state != CharacterState::Dashing {
        next = CharacterState::Dashing;
    }

    if health <= 0 {
        next = CharacterState::Death;
    }

    next
}

fn table_transition(
    state: CharacterState,
    timers: &AbilityTimers,
    observation: &Observation,
    input: &InputSample,
    dash_time: f32,
) -> CharacterState {
    use CharacterState::*;

    let moving = observation.horizontal_speed > 0.0;

    match state {
        Idle => {
            if moving {
                Walking
            } else if !observation.grounded {
                Jumping
            } else {
                Idle
            }
        }
        Walking => {
            if !moving {
                Idle
            } else if !observation.grounded {
                Jumping
            } else {
                Walking
            }
        }
        Jumping => {
            if observation.grounded {
                if moving { Walking } else { Idle }
            } else if holds_wall(observation, input) {
                WallCling
            } else {
                Jumping
            }
        }
        WallCling => {
            if holds_wall(observation, input) {
                WallCling
            } else {
                Jumping
            }
        }
        Dashing => {
            // Ends airborne regardless of ground contact
            if timers.dash_expired(dash_time) {
                Jumping
            } else {
                Dashing
            }
        }
        Death => Death,
    }
}

// =============================================================================
// TESTS
// =============================================================================
