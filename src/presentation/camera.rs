//! Camera Shake
//!
//! Landing shake as an explicit countdown. Jitter comes from a seeded
//! generator so replays shake identically.

use crate::core::rng::DeterministicRng;
use glam::Vec2;
use crate::game::config::PresentationConfig;
use crate::game::tick::TickResult;

/// Runtime shake state.
#[derive(Clone, Debug)]
pub struct CameraShake {
    config: PresentationConfig,
    rng: DeterministicRng,

    /// Shake intensity (world units)
    intensity: f32,

    /// Remaining shake time (s)
    remaining: f32,
}

impl CameraShake {
    /// Idle shake with a jitter seed.
    pub fn new(config: PresentationConfig, seed: u64) -> Self {
        Self {
            config,
            rng: DeterministicRng::new(seed),
            intensity: 0.0,
            remaining: 0.0,
        }
    }

    /// Start (or restart) a shake for a landing at `impact` speed.
    pub fn start(&mut self, impact: f32) {
        self.intensity = impact.abs() * self.config.shake_multiplier;
        self.remaining = self.config.shake_duration;
    }

    /// Consume one tick's output; starts a shake on landing.
    pub fn observe(&mut self, result: &TickResult) {
        if let Some(impact) = result.ground_impact {
            self.start(impact);
        }
    }

    /// Advance by `dt`. Returns the offset to apply to the camera.
    pub fn update(&mut self, dt: f32) -> Vec2 {
        if self.remaining <= 0.0 {
            return Vec2::ZERO;
        }

        self.remaining -= dt;
        self.rng.inside_unit_circle() * self.intensity
    }

    /// Stop immediately.
    pub fn cancel(&mut self) {
        self.intensity = 0.0;
        self.remaining = 0.0;
    }

    /// Whether a shake is running.
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Current intensity.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shake() -> CameraShake {
        CameraShake::new(PresentationConfig::default(), 7)
    }

    #[test]
    fn test_shake_runs_for_duration() {
        let mut camera = shake();
        assert_eq!(camera.update(0.02), Vec2::ZERO);

        camera.start(-15.0);
        assert!((camera.intensity() - 0.3).abs() < 1e-6);

        // 0.35s runs out during the sixth 0.06s step
        for _ in 0..6 {
            assert!(camera.is_active());
            let offset = camera.update(0.06);
            assert!(offset.length() <= camera.intensity() + 1e-6);
        }
        assert!(!camera.is_active());
        assert_eq!(camera.update(0.05), Vec2::ZERO);
    }

    #[test]
    fn test_new_impact_restarts() {
        let mut camera = shake();
        camera.start(-10.0);
        camera.update(0.3);

        camera.start(-20.0);
        camera.update(0.3);
        assert!(camera.is_active());
        assert!((camera.intensity() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_cancel() {
        let mut camera = shake();
        camera.start(-10.0);
        camera.cancel();
        assert!(!camera.is_active());
        assert_eq!(camera.update(0.02), Vec2::ZERO);
    }

    #[test]
    fn test_same_seed_same_jitter() {
        let mut a = shake();
        let mut b = shake();
        a.start(-12.0);
        b.start(-12.0);
        for _ in 0..5 {
            assert_eq!(a.update(0.02), b.update(0.02));
        }
    }
}
