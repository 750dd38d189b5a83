//! Simulated device configuration
//!
//! ```toml
//! [device]
//! type = "mock"
//!
//! [device.simulation]
//! idle_ms = 2000         # presence released
//! touch_ms = 800         # presence asserted
//! poll_interval_ms = 1   # emulated presence bus latency
//! random_seed = 42       # 0 = random each run
//! ```

use serde::{Deserialize, Serialize};

/// Timing, noise and fault injection for the mock device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Length of each released period (ms)
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,

    /// Length of each touched period (ms)
    #[serde(default = "default_touch_ms")]
    pub touch_ms: u64,

    /// Delay added to every presence poll (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Noise seed; 0 draws from entropy
    #[serde(default)]
    pub random_seed: u64,

    /// Accelerometer noise standard deviation (g)
    #[serde(default = "default_accel_stddev")]
    pub accel_stddev: f64,

    /// Gyroscope noise standard deviation (°/s)
    #[serde(default = "default_gyro_stddev")]
    pub gyro_stddev: f64,

    /// Yaw rate applied while touched (°/s)
    #[serde(default = "default_twist_dps")]
    pub twist_dps: f64,

    /// Probability that a sample read fails
    #[serde(default)]
    pub read_failure_rate: f64,
}

fn default_idle_ms() -> u64 {
    2000
}

fn default_touch_ms() -> u64 {
    800
}

fn default_poll_interval_ms() -> u64 {
    1
}

fn default_accel_stddev() -> f64 {
    0.004
}

fn default_gyro_stddev() -> f64 {
    0.1
}

fn default_twist_dps() -> f64 {
    90.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            idle_ms: default_idle_ms(),
            touch_ms: default_touch_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            random_seed: 0,
            accel_stddev: default_accel_stddev(),
            gyro_stddev: default_gyro_stddev(),
            twist_dps: default_twist_dps(),
            read_failure_rate: 0.0,
        }
    }
}
