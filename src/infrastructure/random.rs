use crate::domain::ports::RandomSource;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Draws from the calling thread's generator. Nothing is shared between
/// requests, so there is no lock to contend on.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn alphanumeric(&self, len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    fn unit(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }

    fn between(&self, min: u64, max: u64) -> u64 {
        rand::thread_rng().gen_range(min..=max)
    }
}

/// A reproducible source: the same seed yields the same sequence of draws.
///
/// Draw order across concurrent requests still depends on scheduling.
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

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned lock only means another draw panicked; the generator is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

impl RandomSource for SeededRandom {
    fn alphanumeric(&self, len: usize) -> String {
        self.with_rng(|rng| {
            rng.sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
    }

    fn unit(&self) -> f64 {
        self.with_rng(|rng| rng.gen_range(0.0..1.0))
    }

    fn between(&self, min: u64, max: u64) -> u64 {
        self.with_rng(|rng| rng.gen_range(min..=max))
    }
}
