//! Locomotion Events
//!
//! Change notifications emitted at the end of a tick for presentation
//! consumers and replay logs. Consumers read these; they never write back.

use serde::{Serialize, Deserialize};

use glam::Vec2;
use crate::game::state::{CharacterState, FacingDirection};

/// Order in which events of one tick are emitted.
///
/// Lower value = emitted first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventOrder {
    /// State changes lead so animation switches before anything else
    StateChange = 0,
    /// Ability activations
    Ability = 1,
    /// Sprite mirroring
    Facing = 2,
    /// Landing feedback
    Impact = 3,
    /// Terminal notification
    Death = 4,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventData {
    /// Committed state changed
    StateChanged {
        /// State before the tick
        from: CharacterState,
        /// State after the tick
        to: CharacterState,
    },

    /// Facing flipped
    FacingChanged {
        /// New facing
        facing: FacingDirection,
    },

    /// Jump impulse applied
    Jumped {
        /// Launched from the coyote window rather than the ground
        coyote: bool,
    },

    /// Launched off a wall
    WallJumped,

    /// Dash began
    DashStarted {
        /// Unit dash direction
        direction: Vec2,
    },

    /// Landed from a jump or dash
    GroundImpact {
        /// Last negative vertical velocity before landing
        speed: f32,
    },

    /// Entered the death state
    Died,
}

impl EventData {
    /// Emission order for this payload.
    pub fn order(&self) -> EventOrder {
        match self {
            EventData::StateChanged { .. } => EventOrder::StateChange,
            EventData::Jumped { .. } | EventData::WallJumped | EventData::DashStarted { .. } => {
                EventOrder::Ability
            }
            EventData::FacingChanged { .. } => EventOrder::Facing,
            EventData::GroundImpact { .. } => EventOrder::Impact,
            EventData::Died => EventOrder::Death,
        }
    }
}

/// An event stamped with the tick that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocomotionEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: EventData,
}

impl LocomotionEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: EventData) -> Self {
        Self { tick, data }
    }

    /// Create state changed event.
    pub fn state_changed(tick: u64, from: CharacterState, to: CharacterState) -> Self {
        Self::new(tick, EventData::StateChanged { from, to })
    }

    /// Create facing changed event.
    pub fn facing_changed(tick: u64, facing: FacingDirection) -> Self {
        Self::new(tick, EventData::FacingChanged { facing })
    }

    /// Create jumped event.
    pub fn jumped(tick: u64, coyote: bool) -> Self {
        Self::new(tick, EventData::Jumped { coyote })
    }

    /// Create wall jumped event.
    pub fn wall_jumped(tick: u64) -> Self {
        Self::new(tick, EventData::WallJumped)
    }

    /// Create dash started event.
    pub fn dash_started(tick: u64, direction: Vec2) -> Self {
        Self::new(tick, EventData::DashStarted { direction })
    }

    /// Create ground impact event.
    pub fn ground_impact(tick: u64, speed: f32) -> Self {
        Self::new(tick, EventData::GroundImpact { speed })
    }

    /// Create died event.
    pub fn died(tick: u64) -> Self {
        Self::new(tick, EventData::Died)
    }

    /// Sort key: tick, then emission order.
    pub fn sort_key(&self) -> (u64, EventOrder) {
        (self.tick, self.data.order())
    }
}
