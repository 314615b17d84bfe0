//! Ability Timers
//!
//! Countdowns and flags that gate jumping and dashing. All of them are
//! explicit per-tick values, so a dash can be cut short (by death, say)
//! without leaving anything running in the background.

use serde::{Serialize, Deserialize};

use crate::core::hash::{HashInto, StateHasher};
use crate::game::state::CharacterState;

/// Timers owned by the tick orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityTimers {
    /// Seconds since the body was last grounded (coyote window)
    pub time_since_grounded: f32,

    /// Seconds spent in the current dash
    pub dash_elapsed: f32,

    /// Whether a dash may be started
    pub can_dash: bool,
}

impl Default for AbilityTimers {
    fn default() -> Self {
        Self {
            time_since_grounded: 0.0,
            dash_elapsed: 0.0,
            can_dash: true,
        }
    }
}

impl AbilityTimers {
    /// Refresh timers at the start of a tick.
    ///
    /// `state` is the state committed last tick; the dash clock only runs
    /// while it is `Dashing`.
    pub fn advance(&mut self, grounded: bool, state: CharacterState, fixed_delta: f32) {
        if grounded {
            self.time_since_grounded = 0.0;
        } else {
            self.time_since_grounded += fixed_delta;
        }

        if state == CharacterState::Dashing {
            self.dash_elapsed += fixed_delta;
        }
    }

    /// Apply the timer side effects of an observed state change.
    pub fn on_transition(&mut self, from: CharacterState, to: CharacterState) {
        if from == to {
            return;
        }

        if to == CharacterState::Dashing {
            self.can_dash = false;
            self.dash_elapsed = 0.0;
        }

        // Landing from a jump is the only thing that refunds the dash
        if from == CharacterState::Jumping && to.is_grounded() {
            self.can_dash = true;
        }

        if to == CharacterState::Death {
            self.dash_elapsed = 0.0;
        }
    }

    /// Whether a late jump is still allowed.
    #[inline]
    pub fn coyote_available(&self, coyote_time: f32) -> bool {
        self.time_since_grounded < coyote_time
    }

    /// Close the coyote window after a jump so one contact grants one jump.
    #[inline]
    pub fn consume_coyote(&mut self, coyote_time: f32) {
        self.time_since_grounded = self.time_since_grounded.max(coyote_time);
    }

    /// Whether the current dash has run its full duration.
    #[inline]
    pub fn dash_expired(&self, dash_time: f32) -> bool {
        self.dash_elapsed >= dash_time
    }
}

impl HashInto for AbilityTimers {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher
            .write(&self.time_since_grounded)
            .write(&self.dash_elapsed)
            .write(&self.can_dash);
    }
}

// =============================================================================
// TESTS
// =============================================================================
