// THEORY:
// Pointillism is the only randomized effect. It never talks to a generator
// directly; it asks a `RandomSource` for bounded integers. Production code uses
// `nanorand`'s WyRand, optionally seeded, and tests can plug in a scripted source
// to pin every coordinate and radius.

use nanorand::{Rng, WyRand};

/// Supplies uniformly distributed integers.
pub trait RandomSource {
    /// A value in `0..bound`. `bound` is never zero.
    fn next_below(&mut self, bound: u32) -> u32;
}

impl RandomSource for WyRand {
    fn next_below(&mut self, bound: u32) -> u32 {
        // Multiply-shift maps a full-width draw onto 0..bound.
        ((self.generate::<u32>() as u64 * bound as u64) >> 32) as u32
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_below(&mut self, bound: u32) -> u32 {
        (**self).next_below(bound)
    }
}

/// WyRand seeded from `seed`, or from system entropy when absent.
pub fn wyrand(seed: Option<u64>) -> WyRand {
    match seed {
        Some(seed) => WyRand::new_seed(seed),
        None => WyRand::new(),
    }
}
