//! RNG oracle for modifier rolls and weather.
//!
//! Health and mana modifiers roll uniformly inside their configured range, and
//! areas roll a die for weather changes. Both go through [`RngOracle`] so tests
//! can pin the sequence with a seed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Random source shared by every entity in a tick.
///
/// Implementations must be usable through a shared reference from any thread.
pub trait RngOracle: Send + Sync {
    /// Draw the next 32 random bits.
    fn next_u32(&self) -> u32;

    /// Draw the next 64 random bits.
    fn next_u64(&self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    /// Uniform integer in `[min, max]` inclusive.
    ///
    /// Reversed bounds are swapped; equal bounds return the bound without drawing.
    fn range(&self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        if low == high {
            return low;
        }
        let span = high.abs_diff(low).wrapping_add(1);
        if span == 0 {
            return low.wrapping_add(self.next_u64() as i64);
        }
        low.wrapping_add((self.next_u64() % span) as i64)
    }

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, sides: i64) -> i64 {
        self.range(1, sides)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state. The state lives in an atomic so a
/// single generator can be shared by reference across the simulation.
#[derive(Debug)]
pub struct PcgRng {
    state: AtomicU64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(Self::pcg_step(seed)),
        }
    }

    /// Advance the PCG state by one step.
    ///
    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl Default for PcgRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self) -> u32 {
        let previous = self
            .state
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
                Some(Self::pcg_step(s))
            })
            .unwrap_or_else(|s| s);
        Self::pcg_output(Self::pcg_step(previous))
    }
}
