//! Core abstractions shared by the acquisition pipeline and device layer.
//!
//! - [`source`]: Traits to implement for new hardware ([`SampleSource`], [`PresenceSignal`])
//! - [`types`]: Samples, raw word decoding, and full-scale ranges

pub mod source;
pub mod types;

pub use source::{PresenceSignal, SampleSource};
pub use types::{AccelFullScale, Axes, FullScale, GyroFullScale, Sample};
