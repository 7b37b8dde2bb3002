//! Random number adapters.
//!
//! Seeded streams hash the seed string with FNV-1a and feed a ChaCha8
//! generator, which is reproducible across platforms and releases. Ambient
//! streams use the thread RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use questwright_domain::value_objects::DieRoller;
use questwright_engine_ports::outbound::RandomPort;

/// FNV-1a, 64-bit. Stable across runs, unlike the std hasher.
fn fnv1a(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    input
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Deterministic dice stream for one seed string.
pub struct SeededRoller {
    rng: ChaCha8Rng,
}

impl SeededRoller {
    pub fn from_seed(seed: &str) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(fnv1a(seed)),
        }
    }
}

impl DieRoller for SeededRoller {
    fn roll_die(&mut self, sides: u32) -> i32 {
        self.rng.gen_range(1..=sides.max(1)) as i32
    }
}

struct AmbientRoller {
    rng: StdRng,
}

impl DieRoller for AmbientRoller {
    fn roll_die(&mut self, sides: u32) -> i32 {
        self.rng.gen_range(1..=sides.max(1)) as i32
    }
}

/// Production RandomPort implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededRandom;

impl SeededRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomPort for SeededRandom {
    fn seeded(&self, seed: &str) -> Box<dyn DieRoller> {
        Box::new(SeededRoller::from_seed(seed))
    }

    fn ambient(&self) -> Box<dyn DieRoller> {
        Box::new(AmbientRoller {
            rng: StdRng::from_entropy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededRoller::from_seed("battle-1");
        let mut b = SeededRoller::from_seed("battle-1");
        let rolls_a: Vec<i32> = (0..10).map(|_| a.roll_die(20)).collect();
        let rolls_b: Vec<i32> = (0..10).map(|_| b.roll_die(20)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRoller::from_seed("battle-1");
        let mut b = SeededRoller::from_seed("battle-2");
        let rolls_a: Vec<i32> = (0..20).map(|_| a.roll_die(20)).collect();
        let rolls_b: Vec<i32> = (0..20).map(|_| b.roll_die(20)).collect();
        assert_ne!(rolls_a, rolls_b);
    }

    #[test]
    fn test_rolls_stay_in_range() {
        let mut roller = SeededRoller::from_seed("range");
        for _ in 0..200 {
            let roll = roller.roll_die(6);
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_port_seeded_matches_roller() {
        let port = SeededRandom::new();
        let mut from_port = port.seeded("x");
        let mut direct = SeededRoller::from_seed("x");
        assert_eq!(from_port.roll_die(20), direct.roll_die(20));
    }
}
