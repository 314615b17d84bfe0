//! Animation selection.

use serde::{Serialize, Deserialize};

use crate::game::config::PresentationConfig;
use crate::game::state::{CharacterState, FacingDirection};
use crate::game::tick::TickResult;

/// One clip per locomotion state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationClip {
    /// "Idle"
    Idle,
    /// "Walking"
    Walking,
    /// "Jumping"
    Jumping,
    /// "Dashing"
    Dashing,
    /// "Wall Cling"
    WallCling,
    /// "Death"
    Death,
}

impl AnimationClip {
    /// Clip for a committed state.
    pub fn for_state(state: CharacterState) -> Self {
        match state {
            CharacterState::Idle => AnimationClip::Idle,
            CharacterState::Walking => AnimationClip::Walking,
            CharacterState::Jumping => AnimationClip::Jumping,
            CharacterState::Dashing => AnimationClip::Dashing,
            CharacterState::WallCling => AnimationClip::WallCling,
            CharacterState::Death => AnimationClip::Death,
        }
    }

    /// Identifier the animation player knows the clip by.
    pub fn id(self) -> &'static str {
        match self {
            AnimationClip::Idle => "Idle",
            AnimationClip::Walking => "Walking",
            AnimationClip::Jumping => "Jumping",
            AnimationClip::Dashing => "Dashing",
            AnimationClip::WallCling => "Wall Cling",
            AnimationClip::Death => "Death",
        }
    }
}

/// Sprites are authored facing right.
#[inline]
pub fn flip_x(facing: FacingDirection) -> bool {
    facing == FacingDirection::Left
}

/// Request to fade into a new clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipChange {
    /// Clip to play
    pub clip: AnimationClip,
    /// Fade length (s)
    pub crossfade: f32,
}

/// Tracks what is playing and asks for a cross-fade only when the
/// committed state changes.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDriver {
    current: Option<AnimationClip>,
    flip_x: bool,
    crossfade: f32,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(&PresentationConfig::default())
    }
}

impl AnimationDriver {
    /// Nothing playing yet.
    pub fn new(config: &PresentationConfig) -> Self {
        Self {
            current: None,
            flip_x: false,
            crossfade: config.crossfade,
        }
    }

    /// Consume one tick's output. Returns the fade to start, if any.
    pub fn observe(&mut self, result: &TickResult) -> Option<ClipChange> {
        self.flip_x = flip_x(result.facing);

        let clip = AnimationClip::for_state(result.state);
        if self.current == Some(clip) {
            return None;
        }

        self.current = Some(clip);
        Some(ClipChange {
            clip,
            crossfade: self.crossfade,
        })
    }

    /// Clip currently playing.
    pub fn current(&self) -> Option<AnimationClip> {
        self.current
    }

    /// Whether the sprite is mirrored.
    pub fn flip_x(&self) -> bool {
        self.flip_x
    }
}
