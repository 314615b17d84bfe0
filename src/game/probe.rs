//! Contact Probes
//!
//! Boolean ground/wall queries answered by the collision collaborator, and
//! a small AABB world that answers them for the demo driver and tests.
//!
//! An unanswerable probe is not a fault. It resolves to "no contact", which
//! biases the character toward airborne states.

use serde::{Serialize, Deserialize};
use tracing::warn;

use glam::Vec2;
use crate::game::config::ProbeShape;
use crate::game::state::Body;

/// Spatial contact queries.
///
/// `None` means the probe source could not answer (missing, misconfigured,
/// not yet loaded).
pub trait ContactProbe {
    /// Is there ground inside the box at `position + offset`?
    fn probe_ground(&self, position: Vec2, size: Vec2, offset: Vec2) -> Option<bool>;

    /// Is there a wall inside the box on the `direction` side (-1 or +1)?
    ///
    /// `offset` is written for the right-hand side; implementors mirror its
    /// X component by `direction`.
    fn probe_wall(&self, position: Vec2, size: Vec2, offset: Vec2, direction: f32) -> Option<bool>;
}

/// A probe source that never answers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContact;

impl ContactProbe for NoContact {
    fn probe_ground(&self, _position: Vec2, _size: Vec2, _offset: Vec2) -> Option<bool> {
        None
    }

    fn probe_wall(&self, _position: Vec2, _size: Vec2, _offset: Vec2, _direction: f32) -> Option<bool> {
        None
    }
}

/// Fixed answers regardless of geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticContacts {
    /// Ground probe answer
    pub ground: Option<bool>,
    /// Left wall probe answer
    pub wall_left: Option<bool>,
    /// Right wall probe answer
    pub wall_right: Option<bool>,
}

impl StaticContacts {
    /// Standing on flat open ground.
    pub const GROUND: Self = Self {
        ground: Some(true),
        wall_left: Some(false),
        wall_right: Some(false),
    };

    /// In open air.
    pub const AIR: Self = Self {
        ground: Some(false),
        wall_left: Some(false),
        wall_right: Some(false),
    };
}

impl ContactProbe for StaticContacts {
    fn probe_ground(&self, _position: Vec2, _size: Vec2, _offset: Vec2) -> Option<bool> {
        self.ground
    }

    fn probe_wall(&self, _position: Vec2, _size: Vec2, _offset: Vec2, direction: f32) -> Option<bool> {
        if direction < 0.0 {
            self.wall_left
        } else {
            self.wall_right
        }
    }
}

// =============================================================================
// CONTACT SAMPLE
// =============================================================================

/// Probe results captured once per tick, before the state machine runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSample {
    /// Ground probe hit
    pub ground: bool,
    /// Wall on the left
    pub wall_left: bool,
    /// Wall on the right
    pub wall_right: bool,
}

impl ContactSample {
    /// Query every probe for a body at `position`.
    pub fn capture<P: ContactProbe + ?Sized>(
        probe: &P,
        position: Vec2,
        shape: &ProbeShape,
        diagnostics: &mut ProbeDiagnostics,
    ) -> Self {
        let ground = probe.probe_ground(position, shape.ground_size, shape.ground_offset);
        let wall_left = probe.probe_wall(position, shape.wall_size, shape.wall_offset, -1.0);
        let wall_right = probe.probe_wall(position, shape.wall_size, shape.wall_offset, 1.0);

        if ground.is_none() && !diagnostics.ground_warned {
            warn!("Ground probe unanswerable, treating as no contact");
            diagnostics.ground_warned = true;
        }
        if (wall_left.is_none() || wall_right.is_none()) && !diagnostics.wall_warned {
            warn!("Wall probe unanswerable, treating as no contact");
            diagnostics.wall_warned = true;
        }

        Self {
            ground: ground.unwrap_or(false),
            wall_left: wall_left.unwrap_or(false),
            wall_right: wall_right.unwrap_or(false),
        }
    }

    /// Wall contact on the side given by an input sign (-1, 0, +1).
    /// Zero input matches no wall.
    #[inline]
    pub fn touching_wall(&self, sign: i8) -> bool {
        match sign {
            s if s < 0 => self.wall_left,
            s if s > 0 => self.wall_right,
            _ => false,
        }
    }
}

/// Remembers which unanswerable-probe warnings were already logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProbeDiagnostics {
    ground_warned: bool,
    wall_warned: bool,
}

// =============================================================================
// AABB WORLD
// =============================================================================

/// Axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Center
    pub center: Vec2,
    /// Half width / half height
    pub half_extents: Vec2,
}

impl Aabb {
    /// Box from its center and full size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    /// Box from min and max corners.
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Strict overlap; touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

/// Static level made of solid boxes.
#[derive(Clone, Debug, Default)]
pub struct ProbeWorld {
    solids: Vec<Aabb>,
}

impl ProbeWorld {
    /// Empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a solid.
    pub fn with_solid(mut self, solid: Aabb) -> Self {
        self.solids.push(solid);
        self
    }

    /// Does `region` overlap any solid?
    pub fn overlaps_any(&self, region: &Aabb) -> bool {
        self.solids.iter().any(|solid| solid.overlaps(region))
    }

    /// Push a body of `half_extents` out of every solid it overlaps.
    ///
    /// Separation is along the axis of least penetration. The velocity
    /// component pointing into the solid is zeroed.
    pub fn resolve_body(&self, body: &mut Body, half_extents: Vec2) {
        for solid in &self.solids {
            let bounds = Aabb {
                center: body.position,
                half_extents,
            };
            if !solid.overlaps(&bounds) {
                continue;
            }

            let (b_min, b_max) = (bounds.min(), bounds.max());
            let (s_min, s_max) = (solid.min(), solid.max());
            let pen_x = (b_max.x - s_min.x).min(s_max.x - b_min.x);
            let pen_y = (b_max.y - s_min.y).min(s_max.y - b_min.y);

            if pen_x < pen_y {
                if body.position.x < solid.center.x {
                    body.position.x -= pen_x;
                    body.velocity.x = body.velocity.x.min(0.0);
                } else {
                    body.position.x += pen_x;
                    body.velocity.x = body.velocity.x.max(0.0);
                }
            } else if body.position.y < solid.center.y {
                body.position.y -= pen_y;
                body.velocity.y = body.velocity.y.min(0.0);
            } else {
                body.position.y += pen_y;
                body.velocity.y = body.velocity.y.max(0.0);
            }
        }
    }
}

impl ContactProbe for ProbeWorld {
    fn probe_ground(&self, position: Vec2, size: Vec2, offset: Vec2) -> Option<bool> {
        let region = Aabb::from_center_size(position + offset, size);
        Some(self.overlaps_any(&region))
    }

    fn probe_wall(&self, position: Vec2, size: Vec2, offset: Vec2, direction: f32) -> Option<bool> {
        let mirrored = Vec2::new(offset.x * direction.signum(), offset.y);
        let region = Aabb::from_center_size(position + mirrored, size);
        Some(self.overlaps_any(&region))
    }
}

// =============================================================================
// TESTS
// =============================================================================
