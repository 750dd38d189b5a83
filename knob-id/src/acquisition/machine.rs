//! Acquisition state machine
//!
//! Driven by one presence reading at a time. Every reading triggers at most
//! one sample read, except the reading that ends an event, which runs the
//! post-roll and the flush to completion before returning.
//!
//! ```text
//!            present                       !present
//!   ┌──────┐ ───────▶ ┌───────────┐ ─────────────────▶ ┌──────────┐
//!   │ Idle │          │ Capturing │                    │ Draining │ M reads
//!   └──────┘ ◀─────── └───────────┘                    └────┬─────┘
//!       ▲     always         ┌──────────┐                   │
//!       └────────────────────│ Flushing │◀──────────────────┘
//!                            └──────────┘
//! ```

use super::capture::CaptureBuffer;
use super::record::{Record, RecordHeader};
use super::ring::PreRollRing;
use super::writer::RecordWriter;
use crate::core::source::SampleSource;
use crate::core::types::{FullScale, Sample};
use std::path::PathBuf;
use std::time::Instant;

/// Largest accepted margin
pub const MARGIN_CAP: usize = 1000;

/// Initial reservation of the capture buffer
pub const CAPTURE_RESERVE: usize = 1000;

/// Per-run acquisition parameters
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    /// Acquisition name, used as record file prefix
    pub name: String,
    pub full_scale: FullScale,
    /// Pre-roll and post-roll length in samples
    pub margin: usize,
}

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No presence; pre-roll is fed
    Idle,
    /// Presence asserted; capture buffer is fed
    Capturing,
    /// Presence ended; reading the post-roll
    Draining,
    /// Handing the record to the writer
    Flushing,
}

/// Counters over the whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    /// Events that reached the flush
    pub events: u32,
    pub records_written: u32,
    /// Records lost to writer failures
    pub records_dropped: u32,
    /// Sample reads that failed and were skipped
    pub skipped_reads: u64,
}

/// What happened to a flushed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    Written(PathBuf),
    Dropped(String),
}

/// Summary of one completed event
#[derive(Debug, Clone)]
pub struct FlushReport {
    pub sequence: u32,
    pub rows: usize,
    pub pre_roll_rows: usize,
    pub post_roll_rows: usize,
    pub sample_rate_hz: Option<f64>,
    pub outcome: FlushOutcome,
}

impl FlushReport {
    pub fn is_written(&self) -> bool {
        matches!(self.outcome, FlushOutcome::Written(_))
    }
}

/// Owns both buffers, the sample source and the record writer
pub struct AcquisitionMachine<S, W> {
    settings: AcquisitionSettings,
    source: S,
    writer: W,
    pre_roll: PreRollRing,
    capture: CaptureBuffer,
    phase: Phase,
    /// Zero reference for row offsets of the current event
    shift_time: Option<Instant>,
    /// Sequence number of the next flushed event
    sequence: u32,
    stats: AcquisitionStats,
}

impl<S: SampleSource, W: RecordWriter> AcquisitionMachine<S, W> {
    pub fn new(mut settings: AcquisitionSettings, source: S, writer: W) -> Self {
        if settings.margin > MARGIN_CAP {
            log::warn!(
                "Margin {} too big, set to the maximum available: {}",
                settings.margin,
                MARGIN_CAP
            );
            settings.margin = MARGIN_CAP;
        }
        let margin = settings.margin;
        Self {
            settings,
            source,
            writer,
            pre_roll: PreRollRing::new(margin),
            capture: CaptureBuffer::with_capacity(CAPTURE_RESERVE),
            phase: Phase::Idle,
            shift_time: None,
            sequence: 0,
            stats: AcquisitionStats::default(),
        }
    }

    /// Start numbering events at `sequence` instead of 0
    pub fn with_first_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    /// Sequence number the next event will be written with
    #[inline]
    pub fn next_sequence(&self) -> u32 {
        self.sequence
    }

    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    pub fn pre_roll(&self) -> &PreRollRing {
        &self.pre_roll
    }

    /// Samples held for the event in progress
    pub fn capture_len(&self) -> usize {
        self.capture.len()
    }

    /// Feed one presence reading.
    ///
    /// Returns a report when this reading completed an event.
    pub fn on_presence(&mut self, present: bool) -> Option<FlushReport> {
        match (self.phase, present) {
            (Phase::Idle, false) => {
                if self.pre_roll.capacity() > 0 {
                    if let Some(sample) = self.read_sample() {
                        self.pre_roll.push(sample);
                    }
                }
                None
            }
            (Phase::Idle, true) => {
                self.begin_event();
                self.capture_one();
                None
            }
            (Phase::Capturing, true) => {
                self.capture_one();
                None
            }
            (Phase::Capturing, false) => {
                self.drain_post_roll();
                Some(self.flush())
            }
            // Draining and Flushing complete inside a single call
            (Phase::Draining | Phase::Flushing, _) => {
                log::error!("Presence reading arrived during {:?}", self.phase);
                None
            }
        }
    }

    /// Drop an unfinished event (e.g. on shutdown). Returns discarded samples.
    pub fn abandon_event(&mut self) -> usize {
        if self.phase != Phase::Capturing {
            return 0;
        }
        let discarded = self.capture.len();
        self.reset_buffers();
        self.phase = Phase::Idle;
        discarded
    }

    fn read_sample(&mut self) -> Option<Sample> {
        match self.source.read_sample() {
            Ok(sample) => Some(sample),
            Err(e) => {
                self.stats.skipped_reads += 1;
                log::debug!("Sample skipped ({:?}): {}", self.phase, e);
                None
            }
        }
    }

    fn capture_one(&mut self) {
        if let Some(sample) = self.read_sample() {
            self.capture.push(sample);
        }
    }

    fn begin_event(&mut self) {
        log::info!("Presence detected, begin acquisition");
        self.shift_time = Some(
            self.pre_roll
                .oldest()
                .map_or_else(Instant::now, |s| s.timestamp),
        );
        self.phase = Phase::Capturing;
    }

    fn drain_post_roll(&mut self) {
        log::info!("Absence detected, stop acquisition");
        self.phase = Phase::Draining;
        self.capture.seal_main();

        let margin = self.settings.margin;
        log::debug!("Doing post-acquisition ({} samples)", margin);
        for _ in 0..margin {
            self.capture_one();
        }
    }

    fn flush(&mut self) -> FlushReport {
        self.phase = Phase::Flushing;
        let sequence = self.sequence;

        let pre_roll = self.pre_roll.snapshot_chronological();
        let window = self.capture.drain();
        let shift_time = self.shift_time.take().unwrap_or_else(Instant::now);

        log::info!(
            "Stop acquisition, dump data: {} pre-roll + {} capture + {} post-roll samples",
            pre_roll.len(),
            window.main_len(),
            window.post_roll_len
        );
        if pre_roll.len() < self.settings.margin {
            log::warn!(
                "Short pre-roll: {} of {} samples available",
                pre_roll.len(),
                self.settings.margin
            );
        }

        let record = Record::assemble(
            RecordHeader {
                name: self.settings.name.clone(),
                sequence,
                full_scale: self.settings.full_scale,
                margin: self.settings.margin,
                pre_roll_len: pre_roll.len(),
                created: chrono::Local::now(),
            },
            &pre_roll,
            &window.samples,
            window.post_roll_len,
            shift_time,
        );

        if record.is_empty() {
            log::warn!("Record {} has no rows: every read in the event failed", sequence);
        }

        let sample_rate_hz = record.sample_rate_hz();
        if let Some(rate) = sample_rate_hz {
            log::info!("Data acquisition rate: {:.0} Hz", rate);
        }

        let outcome = match self.writer.write(&record) {
            Ok(path) => {
                self.stats.records_written += 1;
                log::info!("Record {} written to {}", sequence, path.display());
                FlushOutcome::Written(path)
            }
            Err(e) => {
                self.stats.records_dropped += 1;
                log::error!("Record {} dropped: {}", sequence, e);
                FlushOutcome::Dropped(e.to_string())
            }
        };

        let report = FlushReport {
            sequence,
            rows: record.len(),
            pre_roll_rows: pre_roll.len(),
            post_roll_rows: record.post_roll_rows(),
            sample_rate_hz,
            outcome,
        };

        self.stats.events += 1;
        self.sequence += 1;
        self.reset_buffers();
        self.phase = Phase::Idle;
        log::info!("Ready for new acquisition");
        report
    }

    fn reset_buffers(&mut self) {
        self.capture.clear();
        self.pre_roll.reset();
        self.shift_time = None;
    }
}
