//! Simulated Sensor Driver
//!
//! For demos and tests. Produces plausible indoor readings.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sot_core::world::Scalar;

use super::SensorDriver;
use crate::error::Result;
use crate::model::SensorKind;

const TEMPERATURE_RANGE: (f64, f64) = (15.0, 25.0);
const HUMIDITY_RANGE: (f64, f64) = (40.0, 60.0);
const MOTION_PROBABILITY: f64 = 0.2;

/// Random-reading driver
pub struct SimulatedDriver {
    rng: Mutex<StdRng>,
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of readings
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// One reading without going through the async trait
    pub fn sample(&self, kind: &SensorKind) -> Option<Scalar> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        match kind {
            SensorKind::Temperature => Some(Scalar::Number(round1(
                rng.gen_range(TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1),
            ))),
            SensorKind::Humidity => Some(Scalar::Number(round1(
                rng.gen_range(HUMIDITY_RANGE.0..=HUMIDITY_RANGE.1),
            ))),
            SensorKind::Motion => Some(Scalar::Bool(rng.gen_bool(MOTION_PROBABILITY))),
            SensorKind::Other(_) => None,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl SensorDriver for SimulatedDriver {
    async fn read(&self, kind: &SensorKind) -> Result<Option<Scalar>> {
        Ok(self.sample(kind))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "Simulated"
    }
}
