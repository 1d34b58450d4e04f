//! Injectable randomness for the `choose` and `range` tags.
//!
//! Random tags never reach for a global generator directly. They hold an
//! `Arc<dyn RandomSource>`, so tests and reproducible runs can swap in a
//! seeded or scripted source.
//!
//! ```rust
//! use curlytag::random::{RandomSource, SeededRandom};
//!
//! let a = SeededRandom::new(7);
//! let b = SeededRandom::new(7);
//! assert_eq!(a.below(100), b.below(100));
//!
//! // Closures work too, handy in tests.
//! let always_last = |upper: u64| upper - 1;
//! assert_eq!(always_last.below(3), 2);
//! ```

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed integers.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `0..upper`. Callers never pass zero.
    fn below(&self, upper: u64) -> u64;
}

/// Blanket implementation for closures.
impl<F> RandomSource for F
where
    F: Fn(u64) -> u64 + Send + Sync,
{
    fn below(&self, upper: u64) -> u64 {
        (self)(upper)
    }
}

/// Uses the thread-local generator from `rand`. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, upper: u64) -> u64 {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// A deterministic generator seeded from a fixed value.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a generator that yields the same sequence for the same seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&self, upper: u64) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..upper)
    }
}

/// Picks one item, or `None` for an empty slice.
pub fn pick<'a, T>(source: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let upper = items.len() as u64;
    let index = source.below(upper) % upper;
    items.get(index as usize)
}

/// Returns an integer in the inclusive range `[low, high]`.
///
/// Bounds given in the wrong order are swapped.
pub fn between(source: &dyn RandomSource, low: i64, high: i64) -> i64 {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let span = high.abs_diff(low);
    let offset = match span.checked_add(1) {
        Some(upper) => source.below(upper) % upper,
        // The full i64 range.
        None => source.below(u64::MAX),
    };
    (low as i128 + offset as i128) as i64
}
