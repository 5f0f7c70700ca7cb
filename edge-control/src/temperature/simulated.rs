//! Simulated temperature source.
//!
//! Each read perturbs the held value by a uniform step and nudges it back
//! when it has left the comfort band. The nudge is smaller than the largest
//! step, so the band is soft: a read can land slightly outside it, and later
//! reads drift back.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{DaemonError, TemperatureReading, TemperatureSource};
use crate::config::SourceMode;
use crate::tracing::prelude::*;

/// Value at construction (°C).
pub const INITIAL_C: f64 = 22.0;
/// Largest perturbation per read, either direction (°C).
pub const MAX_STEP_C: f64 = 0.5;
/// Upper edge of the soft band (°C).
pub const UPPER_C: f64 = 30.0;
/// Lower edge of the soft band (°C).
pub const LOWER_C: f64 = 15.0;
/// Correction applied once a step lands outside the band (°C).
pub const CORRECTION_C: f64 = 0.2;

struct Walk {
    value: f64,
    rng: StdRng,
}

impl Walk {
    fn step(&mut self) -> f64 {
        self.value += self.rng.random_range(-MAX_STEP_C..=MAX_STEP_C);

        if self.value > UPPER_C {
            self.value -= CORRECTION_C;
        } else if self.value < LOWER_C {
            self.value += CORRECTION_C;
        }

        self.value
    }
}

/// Random-walk temperature source.
///
/// The walk state sits behind a mutex so concurrent handlers never lose an
/// update; the lock covers exactly one step.
pub struct SimulatedSource {
    walk: Mutex<Walk>,
}

impl SimulatedSource {
    /// Start at [`INITIAL_C`] with an OS-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(INITIAL_C, StdRng::from_os_rng())
    }

    /// Start at [`INITIAL_C`] with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::starting_at(INITIAL_C, seed)
    }

    /// Start at an arbitrary value with a fixed seed.
    pub fn starting_at(value_c: f64, seed: u64) -> Self {
        Self::with_rng(value_c, StdRng::seed_from_u64(seed))
    }

    fn with_rng(value: f64, rng: StdRng) -> Self {
        Self {
            walk: Mutex::new(Walk { value, rng }),
        }
    }

    /// Advance the walk and return the new reading.
    pub fn sample(&self) -> TemperatureReading {
        let value = self.walk.lock().step();
        trace!(value_c = value, "Simulated temperature step");
        TemperatureReading::now(value)
    }

    /// Unrounded current value, without advancing.
    pub fn current(&self) -> f64 {
        self.walk.lock().value
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemperatureSource for SimulatedSource {
    async fn read(&self) -> Result<TemperatureReading, DaemonError> {
        Ok(self.sample())
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Simulated
    }
}
