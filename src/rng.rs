//! Injectable randomness. Every shuffle, CPU tie-break, CPU delay, CPU
//! pick, and timeout auto-play flows through this trait so tests can seed
//! determinism instead of reaching for a global RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

use crate::game::tile::Tile;

pub trait RandomSource: Send + Sync {
    fn shuffle_tiles(&self, tiles: &mut Vec<Tile>);
    fn gen_range_f64(&self, lo: f64, hi: f64) -> f64;
    fn gen_index(&self, len: usize) -> usize;

    /// CPU per-turn thinking delay (5.0-20.0s), zeroed in test mode.
    fn turn_delay(&self) -> Duration;

    /// CPU picking-phase claim delay (1.5-3.0s), zeroed in test mode.
    fn picking_delay(&self) -> Duration;
}

pub struct StdRandomSource {
    rng: Mutex<StdRng>,
    test_mode: bool,
}

impl StdRandomSource {
    pub fn new(test_mode: bool) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            test_mode,
        }
    }

    pub fn seeded(seed: u64, test_mode: bool) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            test_mode,
        }
    }
}

impl RandomSource for StdRandomSource {
    fn shuffle_tiles(&self, tiles: &mut Vec<Tile>) {
        use rand::seq::SliceRandom;
        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        tiles.shuffle(&mut *rng);
    }

    fn gen_range_f64(&self, lo: f64, hi: f64) -> f64 {
        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        rng.gen_range(lo..hi)
    }

    fn gen_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        rng.gen_range(0..len)
    }

    fn turn_delay(&self) -> Duration {
        if self.test_mode {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.gen_range_f64(5.0, 20.0))
        }
    }

    fn picking_delay(&self) -> Duration {
        if self.test_mode {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.gen_range_f64(1.5, 3.0))
        }
    }
}
