//! Random number generation port.
//!
//! Dice streams are seeded per tool call (seed derived from entity ids and a
//! timestamp), never process-global, so concurrent resolutions stay
//! independent and a pinned seed reproduces exactly.

use questwright_domain::value_objects::DieRoller;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// A deterministic dice stream for the given seed string. The same seed
    /// yields the same sequence of die results across runs.
    fn seeded(&self, seed: &str) -> Box<dyn DieRoller>;

    /// An ambient, non-deterministic stream for callers that supplied no
    /// seed.
    fn ambient(&self) -> Box<dyn DieRoller>;

    /// Uniform percent roll in 1..=100 from an ambient stream.
    fn percent(&self) -> u32 {
        self.ambient().roll_die(100) as u32
    }
}
