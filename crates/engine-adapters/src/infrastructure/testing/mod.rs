//! Deterministic test doubles for the clock and RNG ports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use questwright_domain::value_objects::DieRoller;
use questwright_engine_ports::outbound::{ClockPort, RandomPort};

/// A clock pinned to one instant, so derived seeds are stable.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    pub fn at_epoch() -> Self {
        Self {
            instant: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Replays one shared sequence of die results across every roller it hands
/// out, cycling when exhausted. Seeds are ignored.
pub struct FixedRandom {
    values: Arc<Vec<i32>>,
    cursor: Arc<AtomicUsize>,
}

impl FixedRandom {
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            values: Arc::new(values),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct FixedRoller {
    values: Arc<Vec<i32>>,
    cursor: Arc<AtomicUsize>,
}

impl DieRoller for FixedRoller {
    fn roll_die(&mut self, _sides: u32) -> i32 {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.values[index % self.values.len()]
    }
}

impl RandomPort for FixedRandom {
    fn seeded(&self, _seed: &str) -> Box<dyn DieRoller> {
        Box::new(FixedRoller {
            values: self.values.clone(),
            cursor: self.cursor.clone(),
        })
    }

    fn ambient(&self) -> Box<dyn DieRoller> {
        self.seeded("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_random_replays_sequence() {
        let random = FixedRandom::new(vec![20, 3, 1]);
        let mut roller = random.seeded("ignored");
        assert_eq!(roller.roll_die(20), 20);
        assert_eq!(roller.roll_die(20), 3);
        assert_eq!(roller.roll_die(20), 1);
        assert_eq!(roller.roll_die(20), 20);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock::at_epoch();
        assert_eq!(clock.now(), clock.now());
    }
}
