//! Sensor noise for the simulated IMU
//!
//! One seeded RNG stream feeds a Gaussian per sensor (in g and °/s) and the
//! read-failure draw, so a fixed seed replays the same sample sequence.

use super::config::SimulationConfig;
use crate::error::{Error, Result};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution, Normal};

pub struct SensorNoise {
    rng: SmallRng,
    accel: Normal<f64>,
    gyro: Normal<f64>,
    failure: Bernoulli,
}

impl SensorNoise {
    /// Seed 0 draws from entropy; any other seed is reproducible
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let accel = Normal::new(0.0, config.accel_stddev).map_err(|e| {
            Error::Config(format!("accel_stddev {}: {}", config.accel_stddev, e))
        })?;
        let gyro = Normal::new(0.0, config.gyro_stddev)
            .map_err(|e| Error::Config(format!("gyro_stddev {}: {}", config.gyro_stddev, e)))?;
        let failure = Bernoulli::new(config.read_failure_rate).map_err(|_| {
            Error::Config(format!(
                "read_failure_rate must be within [0, 1], got {}",
                config.read_failure_rate
            ))
        })?;

        let rng = match config.random_seed {
            0 => SmallRng::from_entropy(),
            seed => SmallRng::seed_from_u64(seed),
        };
        Ok(Self {
            rng,
            accel,
            gyro,
            failure,
        })
    }

    /// Accelerometer reading around `true_g`
    pub fn accel(&mut self, true_g: [f64; 3]) -> [f64; 3] {
        true_g.map(|v| v + self.accel.sample(&mut self.rng))
    }

    /// Gyroscope reading around `true_dps`
    pub fn gyro(&mut self, true_dps: [f64; 3]) -> [f64; 3] {
        true_dps.map(|v| v + self.gyro.sample(&mut self.rng))
    }

    /// Whether the next bus transfer should fail
    pub fn read_fails(&mut self) -> bool {
        self.failure.sample(&mut self.rng)
    }
}
