//! MPU-9250 accelerometer/gyroscope over I2C
//!
//! Only the registers needed for raw six-axis bursts are touched: power
//! management, the two full-scale selectors and the accelerometer low-pass
//! bypass. The magnetometer is not used.

use crate::core::source::SampleSource;
use crate::core::types::{be_word_to_i16, Axes, FullScale, Sample};
use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;
use std::thread;
use std::time::{Duration, Instant};

/// Default address (AD0 low)
pub const DEFAULT_ADDRESS: u8 = 0x68;

const REG_GYRO_CONFIG: u8 = 0x1b;
const REG_ACCEL_CONFIG: u8 = 0x1c;
const REG_ACCEL_CONFIG_2: u8 = 0x1d;
const REG_ACCEL_XOUT_H: u8 = 0x3b;
const REG_PWR_MGMT_1: u8 = 0x6b;

const PWR_SLEEP: u8 = 0x40;
const FS_SEL_MASK: u8 = 0x18;
/// Bypass the accelerometer DLPF for the highest output rate
const ACCEL_FCHOICE_B: u8 = 0x08;

/// Accel (6) + temperature (2) + gyro (6)
const BURST_LEN: usize = 14;

/// Settle time after each configuration write
const SETTLE: Duration = Duration::from_millis(10);

pub struct Mpu9250<I2C> {
    i2c: I2C,
    address: u8,
    full_scale: FullScale,
}

impl<I2C: I2c> Mpu9250<I2C> {
    /// Wake and configure the sensor, then check it answers a burst read
    pub fn new(i2c: I2C, address: u8, full_scale: FullScale) -> Result<Self> {
        let mut mpu = Self {
            i2c,
            address,
            full_scale,
        };
        mpu.wake()?;
        mpu.configure()?;
        mpu.read_raw()?;
        log::info!(
            "MPU-9250 at {:#04x} ready (accel {}, gyro {})",
            address,
            full_scale.accel,
            full_scale.gyro
        );
        Ok(mpu)
    }

    pub fn full_scale(&self) -> FullScale {
        self.full_scale
    }

    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(Error::bus)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Error::bus)?;
        thread::sleep(SETTLE);
        Ok(())
    }

    fn update_register(&mut self, register: u8, f: impl FnOnce(u8) -> u8) -> Result<u8> {
        let value = f(self.read_register(register)?);
        self.write_register(register, value)?;
        Ok(value)
    }

    fn wake(&mut self) -> Result<()> {
        self.update_register(REG_PWR_MGMT_1, |v| v & !PWR_SLEEP)?;
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        let accel_bits = self.full_scale.accel.register_bits();
        let v = self.update_register(REG_ACCEL_CONFIG, |v| (v & !FS_SEL_MASK) | accel_bits)?;
        log::debug!("ACCEL_CONFIG: {:#04x}", v);

        let v = self.update_register(REG_ACCEL_CONFIG_2, |v| v | ACCEL_FCHOICE_B)?;
        log::debug!("ACCEL_CONFIG_2: {:#04x}", v);

        let gyro_bits = self.full_scale.gyro.register_bits();
        let v = self.update_register(REG_GYRO_CONFIG, |v| (v & !FS_SEL_MASK) | gyro_bits)?;
        log::debug!("GYRO_CONFIG: {:#04x}", v);
        Ok(())
    }

    /// One burst read of accelerometer and gyroscope counts
    pub fn read_raw(&mut self) -> Result<(Axes, Axes)> {
        let mut buf = [0u8; BURST_LEN];
        self.i2c
            .write_read(self.address, &[REG_ACCEL_XOUT_H], &mut buf)
            .map_err(Error::bus)?;

        let word = |i: usize| be_word_to_i16(buf[i], buf[i + 1]);
        let accel = Axes::new(word(0), word(2), word(4));
        // Bytes 6..8 hold the temperature
        let gyro = Axes::new(word(8), word(10), word(12));
        Ok((accel, gyro))
    }
}

impl<I2C: I2c + Send> SampleSource for Mpu9250<I2C> {
    fn read_sample(&mut self) -> Result<Sample> {
        let (accel, gyro) = self.read_raw()?;
        Ok(Sample::new(Instant::now(), accel, gyro))
    }
}
