//! Record assembly: merge pre-roll and capture windows into numbered rows

use crate::core::types::{Axes, FullScale, Sample};
use chrono::{DateTime, Local};
use std::time::Instant;

/// Metadata written ahead of the rows
#[derive(Debug, Clone)]
pub struct RecordHeader {
    /// Acquisition name (file name prefix)
    pub name: String,
    /// Event sequence number within this run
    pub sequence: u32,
    pub full_scale: FullScale,
    /// Configured margin M
    pub margin: usize,
    /// Pre-roll samples actually available (≤ margin)
    pub pre_roll_len: usize,
    /// Wall-clock time the record was assembled
    pub created: DateTime<Local>,
}

/// One output row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    /// 1-based, contiguous across the whole record
    pub num: u64,
    /// Microseconds since the shift time
    pub offset_us: i64,
    pub accel: Axes,
    pub gyro: Axes,
    /// Row was read after presence ended
    pub post_roll: bool,
}

/// Finalized acquisition window for one event
#[derive(Debug, Clone)]
pub struct Record {
    pub header: RecordHeader,
    pub rows: Vec<Row>,
}

impl Record {
    /// Number pre-roll rows first, then capture and post-roll rows, all
    /// offset against `shift_time`.
    ///
    /// `post_roll_len` trailing entries of `captured` are flagged as post-roll.
    pub fn assemble(
        header: RecordHeader,
        pre_roll: &[Sample],
        captured: &[Sample],
        post_roll_len: usize,
        shift_time: Instant,
    ) -> Self {
        let post_roll_start = pre_roll.len() + captured.len().saturating_sub(post_roll_len);

        let rows = pre_roll
            .iter()
            .chain(captured.iter())
            .enumerate()
            .map(|(i, sample)| Row {
                num: i as u64 + 1,
                offset_us: sample.offset_us(shift_time),
                accel: sample.accel,
                gyro: sample.gyro,
                post_roll: i >= post_roll_start,
            })
            .collect();

        Self { header, rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows flagged as post-roll
    pub fn post_roll_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.post_roll).count()
    }

    /// Time between first and last row (microseconds)
    pub fn span_us(&self) -> i64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => last.offset_us - first.offset_us,
            _ => 0,
        }
    }

    /// Average sampling rate over the record, if it spans any time
    pub fn sample_rate_hz(&self) -> Option<f64> {
        let span = self.span_us();
        if span <= 0 || self.rows.len() < 2 {
            return None;
        }
        Some((self.rows.len() - 1) as f64 * 1_000_000.0 / span as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn header(margin: usize, pre_roll_len: usize) -> RecordHeader {
        RecordHeader {
            name: "event".to_string(),
            sequence: 0,
            full_scale: FullScale::default(),
            margin,
            pre_roll_len,
            created: Local::now(),
        }
    }

    fn at(base: Instant, us: u64) -> Sample {
        Sample::new(
            base + Duration::from_micros(us),
            Axes::new(us as i16, 0, 0),
            Axes::default(),
        )
    }

    #[test]
    fn test_numbering_and_flags() {
        let base = Instant::now();
        let pre: Vec<Sample> = (0..3).map(|i| at(base, i * 10)).collect();
        // 4 main + 3 post-roll
        let captured: Vec<Sample> = (3..10).map(|i| at(base, i * 10)).collect();

        let record = Record::assemble(header(3, 3), &pre, &captured, 3, base);

        assert_eq!(record.len(), 10);
        let nums: Vec<u64> = record.rows.iter().map(|r| r.num).collect();
        assert_eq!(nums, (1..=10).collect::<Vec<u64>>());
        let flags: Vec<bool> = record.rows.iter().map(|r| r.post_roll).collect();
        assert_eq!(flags[..7], [false; 7]);
        assert_eq!(flags[7..], [true; 3]);
        assert_eq!(record.post_roll_rows(), 3);
    }

    #[test]
    fn test_offsets_against_shift_time() {
        let base = Instant::now();
        let pre = vec![at(base, 100), at(base, 200)];
        let captured = vec![at(base, 300), at(base, 400), at(base, 500), at(base, 600)];
        let shift = pre[0].timestamp;

        let record = Record::assemble(header(2, 2), &pre, &captured, 2, shift);

        let offsets: Vec<i64> = record.rows.iter().map(|r| r.offset_us).collect();
        assert_eq!(offsets, vec![0, 100, 200, 300, 400, 500]);
        assert_eq!(record.span_us(), 500);
    }

    #[test]
    fn test_no_pre_roll() {
        let base = Instant::now();
        let captured = vec![at(base, 0), at(base, 1000), at(base, 2000)];
        let record = Record::assemble(header(0, 0), &[], &captured, 0, base);

        assert_eq!(record.len(), 3);
        assert!(record.rows.iter().all(|r| !r.post_roll));
        assert_eq!(record.rows[2].num, 3);
    }

    #[test]
    fn test_sample_rate() {
        let base = Instant::now();
        let captured: Vec<Sample> = (0..11).map(|i| at(base, i * 1000)).collect();
        let record = Record::assemble(header(0, 0), &[], &captured, 0, base);
        let rate = record.sample_rate_hz().unwrap();
        assert!((rate - 1000.0).abs() < 1e-6);

        let single = Record::assemble(header(0, 0), &[], &captured[..1], 0, base);
        assert!(single.sample_rate_hz().is_none());
    }
}
