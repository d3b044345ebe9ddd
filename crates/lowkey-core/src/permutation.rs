//! Deterministic unit visiting order for body embedding.
//!
//! Both sides of the protocol walk the candidate units in the same
//! key-derived order. The order is a plain Fisher-Yates shuffle over a seeded
//! PRNG: not cryptographically strong, but exactly reproducible for the same
//! `(seed, len)` on every platform, which is what decode correctness rests on.

use fastrand::Rng;

/// Pseudo-random visiting order over `0..len`.
///
/// `order()[j]` is the candidate position visited at step `j`. Encode writes
/// the j-th body chunk there, decode reads it back from the same place.
#[derive(Debug, Clone)]
pub struct Permutation {
    order: Vec<usize>,
}

impl Permutation {
    /// Shuffles `0..len` with a locally seeded generator.
    ///
    /// Index sampling happens in u64 space and is cast down afterwards, so
    /// 32-bit and wasm targets produce the same sequence as 64-bit ones.
    /// Changing this routine invalidates every previously written carrier.
    pub fn with_seed(seed: u64, len: usize) -> Self {
        let mut rng = Rng::with_seed(seed);

        let mut order: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let j = rng.u64(0..=i as u64) as usize;
            order.swap(i, j);
        }

        Permutation { order }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
