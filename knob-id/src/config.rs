//! Configuration for knob-id
//!
//! Loaded from a TOML file. Every section and key is optional; missing values
//! take the defaults below.
//!
//! ```toml
//! [acquisition]
//! name = "event"
//! output_dir = "data"
//! margin = 250
//! no_header = false
//!
//! [sensor]
//! accel_fs = 2      # g: 2, 4, 8, 16
//! gyro_fs = 250     # °/s: 250, 500, 1000, 2000
//!
//! [device]
//! type = "mpu9250"  # or "mock"
//! i2c_bus = "/dev/i2c-1"
//!
//! [logging]
//! level = "info"
//! ```

use crate::acquisition::MARGIN_CAP;
use crate::core::types::{AccelFullScale, FullScale, GyroFullScale};
use crate::devices::mock::config::SimulationConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub sensor: SensorConfig,
    pub device: DeviceConfig,
    pub logging: LoggingConfig,
}

/// Record naming and windowing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Record file prefix
    pub name: String,
    /// Directory records are written to (created if missing)
    pub output_dir: String,
    /// Pre-roll/post-roll length in samples, clamped to `[0, MARGIN_CAP]`
    pub margin: i64,
    /// Omit the metadata block at the top of each record
    pub no_header: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            name: "event".to_string(),
            output_dir: "data".to_string(),
            margin: 250,
            no_header: false,
        }
    }
}

/// Requested full-scale ranges
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Accelerometer range in g
    pub accel_fs: u16,
    /// Gyroscope range in °/s
    pub gyro_fs: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            accel_fs: 2,
            gyro_fs: 250,
        }
    }
}

/// Hardware selection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device type: "mpu9250" or "mock"
    #[serde(rename = "type")]
    pub device_type: String,
    /// I2C character device shared by both chips
    pub i2c_bus: String,
    pub imu_address: u8,
    pub presence_address: u8,
    /// Used when `type = "mock"`
    pub simulation: SimulationConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: "mpu9250".to_string(),
            i2c_bus: "/dev/i2c-1".to_string(),
            imu_address: crate::devices::mpu9250::DEFAULT_ADDRESS,
            presence_address: crate::devices::mpr121::DEFAULT_ADDRESS,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Margin clamped into `[0, MARGIN_CAP]`
    pub fn margin(&self) -> usize {
        let requested = self.acquisition.margin;
        if requested < 0 {
            log::warn!("Margin {} is negative, set to 0", requested);
            0
        } else if requested as u64 > MARGIN_CAP as u64 {
            log::warn!(
                "Margin {} too big, set to the maximum available: {}",
                requested,
                MARGIN_CAP
            );
            MARGIN_CAP
        } else {
            requested as usize
        }
    }

    /// Requested ranges; unsupported values fall back to 2 g / 250 °/s
    pub fn full_scale(&self) -> FullScale {
        let accel = AccelFullScale::from_g(self.sensor.accel_fs).unwrap_or_else(|| {
            log::warn!(
                "Unsupported accelerometer full scale {}, using {}",
                self.sensor.accel_fs,
                AccelFullScale::default()
            );
            AccelFullScale::default()
        });
        let gyro = GyroFullScale::from_dps(self.sensor.gyro_fs).unwrap_or_else(|| {
            log::warn!(
                "Unsupported gyroscope full scale {}, using {}",
                self.sensor.gyro_fs,
                GyroFullScale::default()
            );
            GyroFullScale::default()
        });
        FullScale { accel, gyro }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.acquisition.name, "event");
        assert_eq!(config.acquisition.output_dir, "data");
        assert_eq!(config.margin(), 250);
        assert!(!config.acquisition.no_header);
        assert_eq!(config.full_scale(), FullScale::default());
        assert_eq!(config.device.device_type, "mpu9250");
        assert_eq!(config.device.imu_address, 0x68);
        assert_eq!(config.device.presence_address, 0x5a);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[acquisition]
name = "knob"
margin = 100

[sensor]
accel_fs = 8
gyro_fs = 2000

[device]
type = "mock"

[device.simulation]
touch_ms = 300
random_seed = 9
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.acquisition.name, "knob");
        assert_eq!(config.acquisition.output_dir, "data");
        assert_eq!(config.margin(), 100);
        assert_eq!(config.full_scale().tag(), "a8w2000");
        assert_eq!(config.device.device_type, "mock");
        assert_eq!(config.device.i2c_bus, "/dev/i2c-1");
        assert_eq!(config.device.simulation.touch_ms, 300);
        assert_eq!(config.device.simulation.idle_ms, 2000);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.margin(), 250);
        assert_eq!(config.device.device_type, "mpu9250");
    }

    #[test]
    fn test_margin_clamped() {
        let mut config = Config::default();
        config.acquisition.margin = 5000;
        assert_eq!(config.margin(), MARGIN_CAP);
        config.acquisition.margin = -3;
        assert_eq!(config.margin(), 0);
        config.acquisition.margin = 0;
        assert_eq!(config.margin(), 0);
        config.acquisition.margin = 1000;
        assert_eq!(config.margin(), 1000);
    }

    #[test]
    fn test_unsupported_full_scale_falls_back() {
        let mut config = Config::default();
        config.sensor.accel_fs = 3;
        config.sensor.gyro_fs = 300;
        assert_eq!(config.full_scale().tag(), "a2w250");

        config.sensor.accel_fs = 16;
        assert_eq!(config.full_scale().accel, AccelFullScale::G16);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[acquisition]\nno_header = true\noutput_dir = \"/tmp/knob\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.acquisition.no_header);
        assert_eq!(config.acquisition.output_dir, "/tmp/knob");
    }

    #[test]
    fn test_load_rejects_bad_types() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[acquisition]\nmargin = \"lots\"").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(crate::error::Error::Toml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/knobid.toml"),
            Err(crate::error::Error::Io(_))
        ));
    }
}
