//! Per-stage deterministic random sequence
//!
//! Every stage reseeds from its stage number, so the same stage always
//! generates the same layout. The generator is a plain value passed into
//! stage generation; there is no global RNG.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Golden-ratio multiplier for the stage-number seed transform
const SEED_MULTIPLIER: u32 = 2_654_435_761;
const SEED_OFFSET: u32 = 0x6D2B_79F5;
/// State increment per draw (Weyl sequence)
const STATE_INCREMENT: u32 = 0x6D2B_79F5;

/// Small, fast 32-bit generator with a multiply-xor-shift output hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRng {
    state: u32,
}

impl StageRng {
    /// Seed from a stage number via a fixed affine transform
    pub fn for_stage(stage_number: u32) -> Self {
        Self {
            state: stage_number
                .wrapping_mul(SEED_MULTIPLIER)
                .wrapping_add(SEED_OFFSET),
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Next raw 32-bit output
    #[inline]
    fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STATE_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / 4_294_967_296.0
    }

    /// Uniform float in `[min, max)` (assumes `min <= max`)
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f64() as f32
    }

    /// Uniform integer in `[min, max]` (assumes `min <= max`)
    #[inline]
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        let span = f64::from(max - min) + 1.0;
        min + ((self.next_f64() * span) as u32).min(max - min)
    }

    /// Fair coin flip
    #[inline]
    pub fn coin(&mut self) -> bool {
        self.next_f64() < 0.5
    }
}

impl RngCore for StageRng {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for StageRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u32::from_le_bytes(seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_stage_same_sequence() {
        let mut a = StageRng::for_stage(7);
        let mut b = StageRng::for_stage(7);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn test_different_stages_diverge() {
        let mut a = StageRng::for_stage(1);
        let mut b = StageRng::for_stage(2);
        let same = (0..32).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 2);
    }

    #[test]
    fn test_unit_interval() {
        let mut rng = StageRng::for_stage(3);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let mut rng = StageRng::for_stage(4);
        let mut seen = [false; 5];
        for _ in 0..1_000 {
            let n = rng.range_inclusive(4, 8);
            assert!((4..=8).contains(&n));
            seen[(n - 4) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(rng.range_inclusive(6, 6), 6);
    }

    #[test]
    fn test_seedable_matches_state() {
        let rng = StageRng::for_stage(5);
        let copy = StageRng::from_seed(rng.state().to_le_bytes());
        assert_eq!(rng, copy);
    }
}
