//! Injectable randomness for the event generator.

use std::{
    ops::Deref,
    sync::{Arc, Mutex, PoisonError},
};

use rand::{Rng, SeedableRng, rngs::StdRng};

// Traits.

/// Source of randomness the generator draws from.
///
/// Implementations must be safe to share between tasks; the generator holds one
/// behind an `Arc` and calls it from whichever thread handles a request.
pub trait RandomSource: Send + Sync + 'static {
    /// Uniform float in `[0, 1)`.
    fn next_fraction(&self) -> f64;

    /// Uniform integer in `low..=high`. Returns `low` when `high <= low`.
    fn range_inclusive(&self, low: usize, high: usize) -> usize;
}

// Structs.

/// Randomness provider for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct RandomProvider {
    inner: Arc<dyn RandomSource>,
}

impl Deref for RandomProvider {
    type Target = dyn RandomSource;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl RandomProvider {
    pub fn new(inner: Arc<dyn RandomSource>) -> Self {
        Self { inner }
    }

    /// Thread-local CSPRNG, instantiated per call.
    pub fn thread() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }

    /// Reproducible sequence from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededRandom::new(seed)))
    }
}

impl Default for RandomProvider {
    fn default() -> Self {
        Self::thread()
    }
}

// Specific implementations.

/// Draws from `rand::thread_rng()`, which is a cryptographically secure generator
/// reseeded from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_fraction(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }

    fn range_inclusive(&self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }

        rand::thread_rng().gen_range(low..=high)
    }
}

/// Seeded generator shared behind a mutex.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_fraction(&self) -> f64 {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).r#gen::<f64>()
    }

    fn range_inclusive(&self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }

        self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen_range(low..=high)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, sync::Mutex};

    use super::RandomSource;

    /// Replays scripted values; falls back to the lowest possible value once drained.
    #[derive(Debug, Default)]
    pub struct ScriptedRandom {
        fractions: Mutex<VecDeque<f64>>,
        integers: Mutex<VecDeque<usize>>,
    }

    impl ScriptedRandom {
        pub fn new(fractions: &[f64], integers: &[usize]) -> Self {
            Self {
                fractions: Mutex::new(fractions.iter().copied().collect()),
                integers: Mutex::new(integers.iter().copied().collect()),
            }
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_fraction(&self) -> f64 {
            self.fractions.lock().unwrap().pop_front().unwrap_or(0.0)
        }

        fn range_inclusive(&self, low: usize, high: usize) -> usize {
            let value = self.integers.lock().unwrap().pop_front().unwrap_or(low);
            value.clamp(low, high.max(low))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_bounds() {
        let random = ThreadRandom;

        for _ in 0..1000 {
            let fraction = random.next_fraction();
            assert!((0.0..1.0).contains(&fraction));

            let value = random.range_inclusive(2, 4);
            assert!((2..=4).contains(&value));
        }

        assert_eq!(random.range_inclusive(3, 3), 3);
        assert_eq!(random.range_inclusive(5, 1), 5);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);

        for _ in 0..100 {
            assert_eq!(a.next_fraction(), b.next_fraction());
            assert_eq!(a.range_inclusive(0, 10), b.range_inclusive(0, 10));
        }
    }
}
