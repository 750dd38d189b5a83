//! Core data types for inertial samples and sensor ranges.
//!
//! Key types:
//! - [`Sample`]: One six-axis reading with its monotonic capture instant
//! - [`Axes`]: Raw signed X/Y/Z triple as delivered by the device
//! - [`AccelFullScale`] / [`GyroFullScale`]: Configured ranges and the
//!   divisors that turn raw counts into g and °/s

use std::fmt;
use std::time::Instant;

/// Reinterpret a raw unsigned 16-bit device word as a two's-complement value.
///
/// Words at or above 32768 map to `word - 65536`; everything below is kept as is.
#[inline]
pub const fn reinterpret_i16(word: u16) -> i16 {
    word as i16
}

/// Decode a big-endian register pair (high byte first) into a signed reading
#[inline]
pub const fn be_word_to_i16(high: u8, low: u8) -> i16 {
    reinterpret_i16(u16::from_be_bytes([high, low]))
}

/// Raw X/Y/Z triple in device counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Axes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Axes {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Convert to physical units with the given sensitivity divisor
    pub fn scaled(&self, divisor: f64) -> [f64; 3] {
        [
            f64::from(self.x) / divisor,
            f64::from(self.y) / divisor,
            f64::from(self.z) / divisor,
        ]
    }
}

impl From<[i16; 3]> for Axes {
    fn from(v: [i16; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// One accelerometer + gyroscope reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Monotonic instant at which the burst read completed
    pub timestamp: Instant,
    /// Accelerometer counts
    pub accel: Axes,
    /// Gyroscope counts
    pub gyro: Axes,
}

impl Sample {
    pub fn new(timestamp: Instant, accel: Axes, gyro: Axes) -> Self {
        Self {
            timestamp,
            accel,
            gyro,
        }
    }

    /// Signed offset of this sample from `reference`, in whole microseconds
    pub fn offset_us(&self, reference: Instant) -> i64 {
        signed_micros_between(reference, self.timestamp)
    }
}

/// `to - from` in whole microseconds, negative when `to` precedes `from`
pub fn signed_micros_between(from: Instant, to: Instant) -> i64 {
    match to.checked_duration_since(from) {
        Some(d) => i64::try_from(d.as_micros()).unwrap_or(i64::MAX),
        None => -i64::try_from(from.duration_since(to).as_micros()).unwrap_or(i64::MAX),
    }
}

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelFullScale {
    /// ±2g (most sensitive)
    #[default]
    G2,
    /// ±4g
    G4,
    /// ±8g
    G8,
    /// ±16g
    G16,
}

impl AccelFullScale {
    /// Look up a range by its magnitude in g
    pub fn from_g(g: u16) -> Option<Self> {
        match g {
            2 => Some(Self::G2),
            4 => Some(Self::G4),
            8 => Some(Self::G8),
            16 => Some(Self::G16),
            _ => None,
        }
    }

    /// Range magnitude in g
    pub const fn g(self) -> u16 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    /// Sensitivity in LSB/g
    pub const fn divisor(self) -> f64 {
        match self {
            Self::G2 => 16384.0,
            Self::G4 => 8192.0,
            Self::G8 => 4096.0,
            Self::G16 => 2048.0,
        }
    }

    /// ACCEL_FS_SEL value already shifted into bits [4:3]
    pub const fn register_bits(self) -> u8 {
        match self {
            Self::G2 => 0x00,
            Self::G4 => 0x08,
            Self::G8 => 0x10,
            Self::G16 => 0x18,
        }
    }
}

impl fmt::Display for AccelFullScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "±{}g", self.g())
    }
}

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GyroFullScale {
    /// ±250 °/s (most sensitive)
    #[default]
    Dps250,
    /// ±500 °/s
    Dps500,
    /// ±1000 °/s
    Dps1000,
    /// ±2000 °/s
    Dps2000,
}

impl GyroFullScale {
    /// Look up a range by its magnitude in °/s
    pub fn from_dps(dps: u16) -> Option<Self> {
        match dps {
            250 => Some(Self::Dps250),
            500 => Some(Self::Dps500),
            1000 => Some(Self::Dps1000),
            2000 => Some(Self::Dps2000),
            _ => None,
        }
    }

    /// Range magnitude in °/s
    pub const fn dps(self) -> u16 {
        match self {
            Self::Dps250 => 250,
            Self::Dps500 => 500,
            Self::Dps1000 => 1000,
            Self::Dps2000 => 2000,
        }
    }

    /// Sensitivity in LSB/(°/s)
    pub const fn divisor(self) -> f64 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// GYRO_FS_SEL value already shifted into bits [4:3]
    pub const fn register_bits(self) -> u8 {
        match self {
            Self::Dps250 => 0x00,
            Self::Dps500 => 0x08,
            Self::Dps1000 => 0x10,
            Self::Dps2000 => 0x18,
        }
    }
}

impl fmt::Display for GyroFullScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "±{}°/s", self.dps())
    }
}

/// Full-scale settings fixed for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullScale {
    pub accel: AccelFullScale,
    pub gyro: GyroFullScale,
}

impl FullScale {
    /// Short tag used in record file names, e.g. `a2w250`
    pub fn tag(&self) -> String {
        format!("a{}w{}", self.accel.g(), self.gyro.dps())
    }
}
