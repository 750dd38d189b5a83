//! Collaborator traits consumed by the acquisition core

use crate::core::types::Sample;
use crate::error::Result;

/// Produces one six-axis sample per call.
///
/// Each call performs a single bus transaction and stamps the sample with the
/// instant the transfer completed. A failed call means this sample is lost;
/// callers decide whether that is fatal.
pub trait SampleSource: Send {
    fn read_sample(&mut self) -> Result<Sample>;
}

/// Boolean presence stream, polled once per call
pub trait PresenceSignal: Send {
    fn read_presence(&mut self) -> Result<bool>;
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn read_sample(&mut self) -> Result<Sample> {
        (**self).read_sample()
    }
}

impl<T: PresenceSignal + ?Sized> PresenceSignal for Box<T> {
    fn read_presence(&mut self) -> Result<bool> {
        (**self).read_presence()
    }
}
