//! Device implementations
//!
//! - `mpu9250`: MPU-9250 inertial sensor plus MPR121 touch controller on
//!   Linux I2C (feature `linux`)
//! - `mock`: simulated pair for hardware-free runs

pub mod mock;
pub mod mpr121;
pub mod mpu9250;

#[cfg(test)]
pub(crate) mod bus_mock;

use crate::config::Config;
use crate::core::source::{PresenceSignal, SampleSource};
use crate::error::{Error, Result};

/// Sample source and presence signal for one run
pub struct DeviceSet {
    pub source: Box<dyn SampleSource>,
    pub presence: Box<dyn PresenceSignal>,
}

/// Create the configured devices
pub fn create_devices(config: &Config) -> Result<DeviceSet> {
    let full_scale = config.full_scale();
    match config.device.device_type.as_str() {
        #[cfg(feature = "linux")]
        "mpu9250" => {
            use linux_embedded_hal::I2cdev;

            let bus = &config.device.i2c_bus;
            let open = || {
                I2cdev::new(bus)
                    .map_err(|e| Error::Bus(format!("Failed to open {}: {}", bus, e)))
            };

            log::info!("Opening {} for MPU-9250 and MPR121", bus);
            let imu = mpu9250::Mpu9250::new(open()?, config.device.imu_address, full_scale)?;
            let touch = mpr121::Mpr121::new(open()?, config.device.presence_address)
                .map_err(|e| Error::Presence(format!("MPR121 setup failed: {}", e)))?;

            Ok(DeviceSet {
                source: Box::new(imu),
                presence: Box::new(touch),
            })
        }
        "mock" => {
            let (imu, presence) = mock::simulated_pair(&config.device.simulation, full_scale)?;
            Ok(DeviceSet {
                source: Box::new(imu),
                presence: Box::new(presence),
            })
        }
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_device() {
        let mut config = Config::default();
        config.device.device_type = "crl200s".to_string();
        assert!(matches!(
            create_devices(&config),
            Err(Error::UnknownDevice(name)) if name == "crl200s"
        ));
    }

    #[test]
    fn test_mock_device_set() {
        let mut config = Config::default();
        config.device.device_type = "mock".to_string();
        config.device.simulation.poll_interval_ms = 0;
        config.device.simulation.idle_ms = 60_000;

        let mut devices = create_devices(&config).unwrap();
        assert!(!devices.presence.read_presence().unwrap());
        assert!(devices.source.read_sample().is_ok());
    }
}
