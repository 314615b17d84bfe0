//! Seeded Jitter Source
//!
//! Xorshift128+ seeded through SplitMix64. The simulation never draws from
//! it; presentation jitter does, so a replay shakes the camera exactly like
//! the live run did.

use serde::{Serialize, Deserialize};

use glam::Vec2;

/// Deterministic PRNG (Xorshift128+).
///
/// # Example
///
/// ```
/// use locomotion::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.inside_unit_circle(), b.inside_unit_circle());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    s0: u64,
    s1: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Expand a 64-bit seed into the 128-bit state.
    pub fn new(seed: u64) -> Self {
        let mut seeder = SplitMix64(seed);
        let s0 = seeder.next();
        let s1 = seeder.next();

        // All-zero state is a fixed point
        if s0 | s1 == 0 {
            return Self { s0: 1, s1: 1 };
        }
        Self { s0, s1 }
    }

    /// Next raw 64 bits.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let (s0, s1) = (self.s0, self.s1 ^ self.s0);
        let out = self.s0.wrapping_add(self.s1);

        self.s0 = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.s1 = s1.rotate_left(37);
        out
    }

    /// Uniform in `[-1, 1)`, from the top 24 bits.
    #[inline]
    pub fn next_signed(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / (1u32 << 23) as f32;
        (self.next_u64() >> 40) as f32 * SCALE - 1.0
    }

    /// Uniform point in the closed unit disc (rejection sampled).
    pub fn inside_unit_circle(&mut self) -> Vec2 {
        loop {
            let point = Vec2::new(self.next_signed(), self.next_signed());
            if point.length_squared() <= 1.0 {
                return point;
            }
        }
    }
}

/// Seed expander. Neighbouring seeds give unrelated outputs.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DeterministicRng::new(12345);
        let mut b = DeterministicRng::new(12345);
        let mut c = DeterministicRng::new(12346);

        let seq_a: Vec<u64> = (0..64).map(|_| a.next_u64()).collect();
        let seq_b: Vec<u64> = (0..64).map(|_| b.next_u64()).collect();
        let seq_c: Vec<u64> = (0..64).map(|_| c.next_u64()).collect();

        assert_eq!(seq_a, seq_b);
        assert_ne!(seq_a, seq_c);
    }

    #[test]
    fn test_signed_range() {
        let mut rng = DeterministicRng::new(9999);
        let (mut saw_negative, mut saw_positive) = (false, false);

        for _ in 0..1000 {
            let value = rng.next_signed();
            assert!((-1.0..1.0).contains(&value));
            saw_negative |= value < 0.0;
            saw_positive |= value > 0.0;
        }
        assert!(saw_negative && saw_positive);
    }

    #[test]
    fn test_unit_circle_covers_every_quadrant() {
        let mut rng = DeterministicRng::new(7777);
        let mut quadrants = [0u32; 4];

        for _ in 0..400 {
            let p = rng.inside_unit_circle();
            assert!(p.length_squared() <= 1.0);
            quadrants[(p.x >= 0.0) as usize * 2 + (p.y >= 0.0) as usize] += 1;
        }
        assert!(quadrants.iter().all(|&n| n > 50), "{:?}", quadrants);
    }

    #[test]
    fn test_clone_resumes_sequence() {
        let mut rng = DeterministicRng::new(5555);
        for _ in 0..50 {
            rng.next_u64();
        }

        let mut fork = rng.clone();
        for _ in 0..10 {
            assert_eq!(rng.next_u64(), fork.next_u64());
        }
    }
}
