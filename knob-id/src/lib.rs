//! knob-id - Presence-triggered inertial acquisition
//!
//! Samples an MPU-9250 while an MPR121 electrode reports a touch and writes
//! one record per touch event, framed by a configurable number of samples
//! before and after the event.
//!
//! ## Features
//!
//! - `linux` (default): MPU-9250/MPR121 over Linux I2C; without it only the
//!   `mock` device is available

pub mod acquisition;
pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
