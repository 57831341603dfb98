//! Random level generation.

use rand::Rng;

/// Draws node levels from a coin-flip (geometric, p = 1/2) distribution.
///
/// A draw starts at 1 and keeps climbing while the coin lands heads, so
/// level 1 comes up about half the time, level 2 a quarter, and so on.
/// Draws are capped at `max_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomLevel {
    max_level: usize,
}

impl RandomLevel {
    /// Creates a generator capped at `max_level`.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    pub fn new(max_level: usize) -> Self {
        assert!(max_level >= 1, "max_level must be at least 1");
        Self { max_level }
    }

    /// The cap applied to every draw
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Draws a level in `1..=max_level` using `rng`
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut level = 1;
        while level < self.max_level && rng.gen_bool(0.5) {
            level += 1;
        }
        level
    }
}
