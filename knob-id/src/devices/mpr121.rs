//! MPR121 capacitive touch controller used as the presence signal
//!
//! Only electrode 0 is enabled; presence is its touch status bit.

use crate::core::source::PresenceSignal;
use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;
use std::thread;
use std::time::Duration;

/// Default address (ADDR tied to ground)
pub const DEFAULT_ADDRESS: u8 = 0x5a;

const REG_TOUCH_STATUS_L: u8 = 0x00;
const REG_SOFT_RESET: u8 = 0x80;
const REG_ECR: u8 = 0x5e;

const SOFT_RESET_MAGIC: u8 = 0x63;
/// Baseline tracking on, electrode 0 only
const ECR_ELECTRODE_0: u8 = 0x81;

const TOUCH_THRESHOLD: u8 = 12;
const RELEASE_THRESHOLD: u8 = 6;

/// Register writes applied after reset, with electrodes stopped
const SETUP: &[(u8, u8)] = &[
    (REG_ECR, 0x00),
    // Electrode 0 touch/release thresholds
    (0x41, TOUCH_THRESHOLD),
    (0x42, RELEASE_THRESHOLD),
    // Baseline filter: rising
    (0x2b, 0x01),
    (0x2c, 0x01),
    (0x2d, 0x0e),
    (0x2e, 0x00),
    // falling
    (0x2f, 0x01),
    (0x30, 0x05),
    (0x31, 0x01),
    (0x32, 0x00),
    // touched
    (0x33, 0x00),
    (0x34, 0x00),
    (0x35, 0x00),
    // Debounce
    (0x5b, 0x00),
    // 16 uA charge current, 0.5 us charge time, 1 ms period
    (0x5c, 0x10),
    (0x5d, 0x20),
    (REG_ECR, ECR_ELECTRODE_0),
];

pub struct Mpr121<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mpr121<I2C> {
    /// Reset and configure the controller, then read the touch status once
    pub fn new(i2c: I2C, address: u8) -> Result<Self> {
        let mut mpr = Self { i2c, address };
        mpr.write_register(REG_SOFT_RESET, SOFT_RESET_MAGIC)?;
        thread::sleep(Duration::from_millis(10));

        for &(register, value) in SETUP {
            mpr.write_register(register, value)?;
        }
        mpr.touched()?;
        log::info!("MPR121 at {:#04x} ready (electrode 0)", address);
        Ok(mpr)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Error::bus)
    }

    /// Touch status of electrode 0
    pub fn touched(&mut self) -> Result<bool> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_TOUCH_STATUS_L], &mut buf)
            .map_err(Error::bus)?;
        Ok(buf[0] & 0x01 != 0)
    }
}

impl<I2C: I2c + Send> PresenceSignal for Mpr121<I2C> {
    fn read_presence(&mut self) -> Result<bool> {
        self.touched()
            .map_err(|e| Error::Presence(format!("touch status: {}", e)))
    }
}
