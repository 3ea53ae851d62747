//! Simulation Environment implementation.
//!
//! `SimEnv` is the deterministic counterpart of a system environment: time is
//! a virtual clock that only moves when the harness advances it, and
//! randomness comes from a ChaCha8 stream seeded once per run. Two runs with
//! the same seed and the same operations produce the same room codes and the
//! same notice timings.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use kingside_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic environment for simulation.
///
/// Clones share the same clock and RNG stream.
#[derive(Clone)]
pub struct SimEnv {
    seed: u64,
    state: Arc<Mutex<SimState>>,
}

struct SimState {
    rng: ChaCha8Rng,
    now: Instant,
}

impl SimEnv {
    /// Create an environment whose randomness is derived from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let state = SimState { rng: ChaCha8Rng::seed_from_u64(seed), now: Instant::now() };
        Self { seed, state: Arc::new(Mutex::new(state)) }
    }

    /// Seed this environment was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now += duration;
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).rng.fill_bytes(buffer);
    }
}
