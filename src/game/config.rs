//! Tunable Parameters
//!
//! Designer-facing knobs and the movement constants derived from them.
//! Validation happens once, at construction; a `MovementProfile` that exists
//! is always safe to integrate with.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use glam::Vec2;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `accelerationTime` would divide by zero or flip the sign.
    #[error("acceleration_time must be positive, got {0}")]
    NonPositiveAccelerationTime(f32),

    /// `apexTime` would divide by zero in the gravity derivation.
    #[error("apex_time must be positive, got {0}")]
    NonPositiveApexTime(f32),

    /// `dashSpeed` would divide by zero in the dash duration derivation.
    #[error("dash_speed must be positive, got {0}")]
    NonPositiveDashSpeed(f32),

    /// A field that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Offending field
        field: &'static str,
        /// Supplied value
        value: f32,
    },

    /// A field that must be zero or greater was negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending field
        field: &'static str,
        /// Supplied value
        value: f32,
    },

    /// NaN or infinity in any field.
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `TunableParameters`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Probe boxes handed to the collision collaborator.
///
/// Offsets are relative to the body position. The wall offset is mirrored
/// by the probe direction, so it is written for the right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeShape {
    /// Ground probe box size
    pub ground_size: Vec2,
    /// Ground probe box center offset
    pub ground_offset: Vec2,
    /// Wall probe box size
    pub wall_size: Vec2,
    /// Wall probe box center offset (right side)
    pub wall_offset: Vec2,
}

impl Default for ProbeShape {
    fn default() -> Self {
        // Sized for a 1x1 body centered on its position
        Self {
            ground_size: Vec2::new(0.9, 0.1),
            ground_offset: Vec2::new(0.0, -0.5),
            wall_size: Vec2::new(0.1, 0.8),
            wall_offset: Vec2::new(0.5, 0.0),
        }
    }
}

/// Designer-facing movement parameters.
///
/// Immutable per character instance once turned into a `MovementProfile`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunableParameters {
    /// Horizontal speed cap (units/s)
    pub max_speed: f32,
    /// Seconds to reach `max_speed` from rest
    pub acceleration_time: f32,
    /// Peak jump height (units)
    pub apex_height: f32,
    /// Seconds to reach the peak
    pub apex_time: f32,
    /// Maximum downward speed (units/s, positive)
    pub terminal_velocity: f32,
    /// Late-jump forgiveness after leaving the ground (s)
    pub coyote_time: f32,
    /// Dash speed (units/s)
    pub dash_speed: f32,
    /// Distance covered by one dash (units)
    pub dash_distance: f32,
    /// Downward speed while clinging; 0 holds in place
    pub wall_slide_speed: f32,
    /// Upward speed still counted as grounded
    pub ground_tolerance: f32,
    /// Probe geometry
    pub probe: ProbeShape,
}

impl Default for TunableParameters {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            acceleration_time: 0.2,
            apex_height: 2.5,
            apex_time: 0.33,
            terminal_velocity: 20.0,
            coyote_time: 0.1,
            dash_speed: 20.0,
            dash_distance: 3.0,
            wall_slide_speed: 0.0,
            ground_tolerance: 0.01,
            probe: ProbeShape::default(),
        }
    }
}

impl TunableParameters {
    /// Check every field, in the order the derivations need them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("max_speed", self.max_speed),
            ("acceleration_time", self.acceleration_time),
            ("apex_height", self.apex_height),
            ("apex_time", self.apex_time),
            ("terminal_velocity", self.terminal_velocity),
            ("coyote_time", self.coyote_time),
            ("dash_speed", self.dash_speed),
            ("dash_distance", self.dash_distance),
            ("wall_slide_speed", self.wall_slide_speed),
            ("ground_tolerance", self.ground_tolerance),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(field));
            }
        }

        let probe = &self.probe;
        if !(probe.ground_size.is_finite()
            && probe.ground_offset.is_finite()
            && probe.wall_size.is_finite()
            && probe.wall_offset.is_finite())
        {
            return Err(ConfigError::NonFinite("probe"));
        }

        if self.acceleration_time <= 0.0 {
            return Err(ConfigError::NonPositiveAccelerationTime(self.acceleration_time));
        }
        if self.apex_time <= 0.0 {
            return Err(ConfigError::NonPositiveApexTime(self.apex_time));
        }
        if self.dash_speed <= 0.0 {
            return Err(ConfigError::NonPositiveDashSpeed(self.dash_speed));
        }

        for (field, value) in [
            ("max_speed", self.max_speed),
            ("terminal_velocity", self.terminal_velocity),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("apex_height", self.apex_height),
            ("coyote_time", self.coyote_time),
            ("dash_distance", self.dash_distance),
            ("wall_slide_speed", self.wall_slide_speed),
            ("ground_tolerance", self.ground_tolerance),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        Ok(())
    }
}

/// Validated parameters plus the constants derived from them.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementProfile {
    params: TunableParameters,
    acceleration: f32,
    gravity: f32,
    jump_velocity: f32,
    dash_time: f32,
}

impl MovementProfile {
    /// Validate and derive.
    ///
    /// - `acceleration = max_speed / acceleration_time`
    /// - `gravity = -2 * apex_height / apex_time^2`
    /// - `jump_velocity = 2 * apex_height / apex_time`
    /// - `dash_time = dash_distance / dash_speed`
    pub fn new(params: TunableParameters) -> Result<Self, ConfigError> {
        params.validate()?;

        let acceleration = params.max_speed / params.acceleration_time;
        let gravity = -2.0 * params.apex_height / (params.apex_time * params.apex_time);
        let jump_velocity = 2.0 * params.apex_height / params.apex_time;
        let dash_time = params.dash_distance / params.dash_speed;

        Ok(Self {
            params,
            acceleration,
            gravity,
            jump_velocity,
            dash_time,
        })
    }

    /// Parse JSON then validate. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: TunableParameters = serde_json::from_str(json)?;
        Self::new(params)
    }

    /// Read a JSON file then validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Source parameters.
    #[inline]
    pub fn params(&self) -> &TunableParameters {
        &self.params
    }

    /// Horizontal acceleration (units/s^2).
    #[inline]
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Gravity (units/s^2, negative).
    #[inline]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Jump impulse (units/s).
    #[inline]
    pub fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    /// Dash duration (s).
    #[inline]
    pub fn dash_time(&self) -> f32 {
        self.dash_time
    }

    /// Horizontal speed cap (units/s).
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.params.max_speed
    }

    /// Maximum falling speed (units/s).
    #[inline]
    pub fn terminal_velocity(&self) -> f32 {
        self.params.terminal_velocity
    }

    /// Late-jump grace window (s).
    #[inline]
    pub fn coyote_time(&self) -> f32 {
        self.params.coyote_time
    }

    /// Dash speed (units/s).
    #[inline]
    pub fn dash_speed(&self) -> f32 {
        self.params.dash_speed
    }
}

impl Default for MovementProfile {
    fn default() -> Self {
        let params = TunableParameters::default();
        // Defaults satisfy every check in `new`
        Self {
            acceleration: params.max_speed / params.acceleration_time,
            gravity: -2.0 * params.apex_height / (params.apex_time * params.apex_time),
            jump_velocity: 2.0 * params.apex_height / params.apex_time,
            dash_time: params.dash_distance / params.dash_speed,
            params,
        }
    }
}

/// Settings for the presentation consumers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Shake intensity per unit of landing speed
    pub shake_multiplier: f32,
    /// Shake duration (s)
    pub shake_duration: f32,
    /// Animation cross-fade length (s)
    pub crossfade: f32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            shake_multiplier: 0.02,
            shake_duration: 0.35,
            crossfade: 0.1,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
