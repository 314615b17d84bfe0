//! Input Samples and Recording
//!
//! Per-tick input as supplied by the device-polling collaborator, plus a
//! delta-compressed recording used for replays and determinism checks.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::hash::{HashInto, StateHash, StateHasher, RECORDING_DOMAIN};
use glam::Vec2;
use crate::game::state::FacingDirection;

// =============================================================================
// INPUT SAMPLE
// =============================================================================

/// Input for a single fixed tick.
///
/// Axes are normalized to `[-1, 1]` on every path in, deserialization
/// included. Buttons are edges, not levels: each flag is set only on the
/// tick the edge happened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    /// Horizontal axis: -1 (left) to +1 (right)
    #[serde(deserialize_with = "deserialize_axis")]
    axis_x: f32,

    /// Vertical axis: -1 (down) to +1 (up)
    #[serde(deserialize_with = "deserialize_axis")]
    axis_y: f32,

    /// Edge flags (packed bits):
    /// - Bit 0: Jump pressed this tick
    /// - Bit 1: Jump released this tick
    /// - Bit 2: Dash pressed this tick
    pub flags: u8,
}

impl InputSample {
    /// Jump pressed flag bit
    pub const FLAG_JUMP_PRESSED: u8 = 0x01;

    /// Jump released flag bit
    pub const FLAG_JUMP_RELEASED: u8 = 0x02;

    /// Dash pressed flag bit
    pub const FLAG_DASH_PRESSED: u8 = 0x04;

    /// Create an idle sample (no axes, no edges).
    pub const fn new() -> Self {
        Self {
            axis_x: 0.0,
            axis_y: 0.0,
            flags: 0,
        }
    }

    /// Create a sample with axis values, clamped to `[-1, 1]`.
    ///
    /// Non-finite axis values read as zero.
    pub fn with_axes(axis_x: f32, axis_y: f32) -> Self {
        Self {
            axis_x: clamp_axis(axis_x),
            axis_y: clamp_axis(axis_y),
            flags: 0,
        }
    }

    /// Builder: set the jump-pressed edge.
    pub fn jump(mut self) -> Self {
        self.set_jump_pressed(true);
        self
    }

    /// Builder: set the jump-released edge.
    pub fn release_jump(mut self) -> Self {
        self.set_jump_released(true);
        self
    }

    /// Builder: set the dash-pressed edge.
    pub fn dash(mut self) -> Self {
        self.set_dash_pressed(true);
        self
    }

    /// Horizontal axis.
    #[inline]
    pub fn axis_x(&self) -> f32 {
        self.axis_x
    }

    /// Vertical axis.
    #[inline]
    pub fn axis_y(&self) -> f32 {
        self.axis_y
    }

    /// Axes as a vector.
    #[inline]
    pub fn axes(&self) -> Vec2 {
        Vec2::new(self.axis_x, self.axis_y)
    }

    /// Check if jump was pressed this tick.
    #[inline]
    pub fn jump_pressed(&self) -> bool {
        self.flags & Self::FLAG_JUMP_PRESSED != 0
    }

    /// Check if jump was released this tick.
    #[inline]
    pub fn jump_released(&self) -> bool {
        self.flags & Self::FLAG_JUMP_RELEASED != 0
    }

    /// Check if dash was pressed this tick.
    #[inline]
    pub fn dash_pressed(&self) -> bool {
        self.flags & Self::FLAG_DASH_PRESSED != 0
    }

    /// Sign of the horizontal axis: -1, 0 or +1.
    #[inline]
    pub fn horizontal_sign(&self) -> i8 {
        if self.axis_x > 0.0 {
            1
        } else if self.axis_x < 0.0 {
            -1
        } else {
            0
        }
    }

    /// Direction a dash launched this tick would take.
    ///
    /// The normalized axis vector, or the facing unit vector when the
    /// stick is centered.
    pub fn dash_direction(&self, facing: FacingDirection) -> Vec2 {
        let axes = self.axes();
        if axes.length_squared() > 0.0 {
            axes.normalize_or_zero()
        } else {
            Vec2::new(facing.sign(), 0.0)
        }
    }

    /// Check if this is an idle sample.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.axis_x == 0.0 && self.axis_y == 0.0 && self.flags == 0
    }

    /// Set jump-pressed flag.
    #[inline]
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.set_flag(Self::FLAG_JUMP_PRESSED, pressed);
    }

    /// Set jump-released flag.
    #[inline]
    pub fn set_jump_released(&mut self, released: bool) {
        self.set_flag(Self::FLAG_JUMP_RELEASED, released);
    }

    /// Set dash-pressed flag.
    #[inline]
    pub fn set_dash_pressed(&mut self, pressed: bool) {
        self.set_flag(Self::FLAG_DASH_PRESSED, pressed);
    }

    /// Same axes, no edges. What a held input looks like on later ticks.
    #[inline]
    fn without_edges(self) -> Self {
        Self { flags: 0, ..self }
    }

    #[inline]
    fn set_flag(&mut self, bit: u8, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }
}

impl HashInto for InputSample {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&self.axis_x).write(&self.axis_y).write(&self.flags);
    }
}

#[inline]
fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn deserialize_axis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    f32::deserialize(deserializer).map(clamp_axis)
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// A recorded input change.
///
/// Only stored when input CHANGES (not every tick). Edge flags belong to
/// `tick` alone; later ticks covered by the same delta replay its axes
/// with no edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u64,
    /// The new input state
    pub sample: InputSample,
}

impl HashInto for InputDelta {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&self.tick).write(&self.sample);
    }
}

/// Complete input recording for one character.
///
/// Used for replay playback and determinism verification.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Starting tick (usually 0)
    pub start_tick: u64,

    /// Last tick covered by the recording
    pub end_tick: u64,

    /// Delta-compressed samples, ordered by tick.
    deltas: Vec<InputDelta>,

    /// What replay yields for the next tick if nothing is stored
    #[serde(skip)]
    held: InputSample,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self {
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            held: InputSample::new(),
        }
    }

    /// Record input for a tick.
    ///
    /// Stores a delta only when `sample` differs from what replay would
    /// produce anyway: the last axes with no edges. Ticks must be recorded
    /// in increasing order; skipped ticks replay as held axes.
    pub fn record(&mut self, tick: u64, sample: InputSample) {
        self.end_tick = tick;

        if sample != self.held {
            self.deltas.push(InputDelta { tick, sample });
            self.held = sample.without_edges();
        }
    }

    /// Get input at a specific tick.
    ///
    /// Idle before the first delta. Edges only on the tick they were
    /// recorded.
    pub fn sample_at(&self, tick: u64) -> InputSample {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);

        match idx.checked_sub(1).map(|i| self.deltas[i]) {
            Some(delta) if delta.tick == tick => delta.sample,
            Some(delta) => delta.sample.without_edges(),
            None => InputSample::new(),
        }
    }

    /// Get all deltas.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Finalize the recording at the last simulated tick.
    pub fn finalize(&mut self, end_tick: u64) {
        self.end_tick = end_tick;
    }

    /// Digest of the covered range and every delta.
    ///
    /// Two recordings with the same digest replay identically.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::with_domain(RECORDING_DOMAIN);
        hasher
            .write(&self.start_tick)
            .write(&self.end_tick)
            .write(self.deltas.as_slice());
        hasher.finish()
    }

    /// Iterate over every tick from `start_tick` to `end_tick` inclusive.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_sample: InputSample::new(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u64,
    delta_idx: usize,
    current_sample: InputSample,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u64, InputSample);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        // Edges from the previous tick's delta have expired
        self.current_sample = self.current_sample.without_edges();
        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick <= self.current_tick {
                self.current_sample = delta.sample;
                self.delta_idx += 1;
            } else {
                break;
            }
        }

        let result = (self.current_tick, self.current_sample);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
