//! Simulated sensor and presence for hardware-free runs
//!
//! Presence follows a fixed schedule: `idle_ms` released, then `touch_ms`
//! touched, repeating from the moment the device set is created. The IMU
//! reports the sensor lying flat (1 g on Z) with Gaussian noise, plus a yaw
//! rate while the knob is touched.
//!
//! ```toml
//! [device]
//! type = "mock"
//!
//! [device.simulation]
//! idle_ms = 1000
//! touch_ms = 300
//! random_seed = 42
//! ```
//!
//! # Thread Model
//!
//! ```text
//! ┌───────────────────┐  AtomicBool  ┌────────────────────┐
//! │ SimulatedPresence │─────────────▶│ SimulatedImu       │
//! │ (presence-poller) │  (touching)  │ (acquisition loop) │
//! └───────────────────┘              └────────────────────┘
//! ```

pub mod config;
mod noise;

use crate::core::source::{PresenceSignal, SampleSource};
use crate::core::types::{Axes, FullScale, Sample};
use crate::error::{Error, Result};

use config::SimulationConfig;
use noise::SensorNoise;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Build a presence/IMU pair sharing the same touch state
pub fn simulated_pair(
    config: &SimulationConfig,
    full_scale: FullScale,
) -> Result<(SimulatedImu, SimulatedPresence)> {
    if config.idle_ms + config.touch_ms == 0 {
        return Err(Error::Config(
            "simulation needs a non-zero idle_ms + touch_ms cycle".to_string(),
        ));
    }
    let noise = SensorNoise::from_config(config)?;

    let touching = Arc::new(AtomicBool::new(false));
    let presence = SimulatedPresence {
        epoch: Instant::now(),
        idle: Duration::from_millis(config.idle_ms),
        touch: Duration::from_millis(config.touch_ms),
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        touching: Arc::clone(&touching),
    };
    let imu = SimulatedImu {
        twist_dps: config.twist_dps,
        full_scale,
        noise,
        touching,
    };

    log::info!(
        "Mock device: {} ms idle / {} ms touch, seed {}",
        config.idle_ms,
        config.touch_ms,
        config.random_seed
    );
    Ok((imu, presence))
}

/// Scheduled touch signal
pub struct SimulatedPresence {
    epoch: Instant,
    idle: Duration,
    touch: Duration,
    poll_interval: Duration,
    touching: Arc<AtomicBool>,
}

impl SimulatedPresence {
    /// Schedule position at `elapsed` since creation
    fn touched_at(&self, elapsed: Duration) -> bool {
        let cycle = (self.idle + self.touch).as_micros();
        let position = elapsed.as_micros() % cycle;
        position >= self.idle.as_micros()
    }
}

impl PresenceSignal for SimulatedPresence {
    fn read_presence(&mut self) -> Result<bool> {
        if !self.poll_interval.is_zero() {
            thread::sleep(self.poll_interval);
        }
        let touched = self.touched_at(self.epoch.elapsed());
        self.touching.store(touched, Ordering::Relaxed);
        Ok(touched)
    }
}

/// Noisy flat-lying IMU
pub struct SimulatedImu {
    twist_dps: f64,
    full_scale: FullScale,
    noise: SensorNoise,
    touching: Arc<AtomicBool>,
}

impl SimulatedImu {
    /// Physical value to device counts, saturating at the range limits
    fn to_counts(value: f64, divisor: f64) -> i16 {
        (value * divisor)
            .round()
            .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
    }

    fn to_axes(values: [f64; 3], divisor: f64) -> Axes {
        let [x, y, z] = values.map(|v| Self::to_counts(v, divisor));
        Axes::new(x, y, z)
    }
}

impl SampleSource for SimulatedImu {
    fn read_sample(&mut self) -> Result<Sample> {
        if self.noise.read_fails() {
            return Err(Error::Bus("simulated NoAcknowledge".to_string()));
        }

        let yaw = if self.touching.load(Ordering::Relaxed) {
            self.twist_dps
        } else {
            0.0
        };

        let accel = self.noise.accel([0.0, 0.0, 1.0]);
        let gyro = self.noise.gyro([0.0, 0.0, yaw]);
        Ok(Sample::new(
            Instant::now(),
            Self::to_axes(accel, self.full_scale.accel.divisor()),
            Self::to_axes(gyro, self.full_scale.gyro.divisor()),
        ))
    }
}
