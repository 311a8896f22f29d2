//! Injected randomness for the generator.

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform value in `[low, high)`. Returns `low` when the range is empty.
    fn range(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        let v = low + self.next_unit() * (high - low);
        // Rounding can land exactly on `high`
        if v < high {
            v
        } else {
            low
        }
    }
}

/// 64-bit linear congruential generator (Knuth MMIX constants).
///
/// Not cryptographic. Same seed, same song.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the system clock.
    pub fn from_time() -> Self {
        Self::new(time_seed())
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for Lcg {
    fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // Top 53 bits fill the f64 mantissa
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Clock-derived seed, mixed so nearby timestamps diverge.
pub fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut x = nanos ^ 0x9e3779b97f4a7c15;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}
