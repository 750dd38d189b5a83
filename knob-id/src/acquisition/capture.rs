//! Event-bounded capture buffer

use crate::core::types::Sample;

/// Samples collected for one event, handed out by [`CaptureBuffer::drain`]
#[derive(Debug, Default)]
pub struct CapturedWindow {
    /// Capture and post-roll samples in insertion order
    pub samples: Vec<Sample>,
    /// How many trailing samples were read after presence ended
    pub post_roll_len: usize,
}

impl CapturedWindow {
    /// Samples read while presence was asserted
    pub fn main_len(&self) -> usize {
        self.samples.len() - self.post_roll_len
    }
}

/// Growable, append-only store for the samples of the current event
///
/// `sealed_at` marks where presence ended; anything pushed after
/// [`seal_main`](Self::seal_main) belongs to the post-roll segment.
pub struct CaptureBuffer {
    samples: Vec<Sample>,
    reserve: usize,
    sealed_at: Option<usize>,
}

impl CaptureBuffer {
    pub fn with_capacity(reserve: usize) -> Self {
        Self {
            samples: Vec::with_capacity(reserve),
            reserve,
            sealed_at: None,
        }
    }

    #[inline]
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Close the main capture segment; later pushes count as post-roll
    pub fn seal_main(&mut self) {
        if self.sealed_at.is_none() {
            self.sealed_at = Some(self.samples.len());
        }
    }

    /// Samples pushed since [`seal_main`](Self::seal_main)
    pub fn post_roll_len(&self) -> usize {
        self.sealed_at
            .map_or(0, |at| self.samples.len().saturating_sub(at))
    }

    /// Move everything out and leave an empty buffer with a fresh reservation
    pub fn drain(&mut self) -> CapturedWindow {
        let post_roll_len = self.post_roll_len();
        let samples = std::mem::replace(&mut self.samples, Vec::with_capacity(self.reserve));
        self.sealed_at = None;
        CapturedWindow {
            samples,
            post_roll_len,
        }
    }

    /// Drop any collected samples without handing them out
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sealed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Axes;
    use std::time::Instant;

    fn sample(tag: i16) -> Sample {
        Sample::new(Instant::now(), Axes::new(tag, 0, 0), Axes::default())
    }

    #[test]
    fn test_drain_preserves_order_and_clears() {
        let mut buffer = CaptureBuffer::with_capacity(8);
        for i in 0..5 {
            buffer.push(sample(i));
        }

        let window = buffer.drain();
        let tags: Vec<i16> = window.samples.iter().map(|s| s.accel.x).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 4]);
        assert_eq!(window.post_roll_len, 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.post_roll_len(), 0);
    }

    #[test]
    fn test_post_roll_segment() {
        let mut buffer = CaptureBuffer::with_capacity(4);
        buffer.push(sample(1));
        buffer.push(sample(2));
        buffer.seal_main();
        buffer.push(sample(3));

        assert_eq!(buffer.post_roll_len(), 1);
        let window = buffer.drain();
        assert_eq!(window.post_roll_len, 1);
        assert_eq!(window.main_len(), 2);

        // Seal is forgotten after drain
        buffer.push(sample(4));
        assert_eq!(buffer.post_roll_len(), 0);
    }

    #[test]
    fn test_grows_past_reservation() {
        let mut buffer = CaptureBuffer::with_capacity(2);
        for i in 0..100 {
            buffer.push(sample(i));
        }
        assert_eq!(buffer.len(), 100);
    }

    #[test]
    fn test_clear_discards() {
        let mut buffer = CaptureBuffer::with_capacity(2);
        buffer.push(sample(1));
        buffer.seal_main();
        buffer.push(sample(2));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain().samples.len(), 0);
    }
}
