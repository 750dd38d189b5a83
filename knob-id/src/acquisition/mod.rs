//! Presence-triggered acquisition
//!
//! - [`ring`]: pre-roll ring fed while idle
//! - [`capture`]: event buffer fed while presence is asserted and during post-roll
//! - [`record`]: row numbering, offsets and post-roll flags
//! - [`writer`]: record persistence
//! - [`machine`]: the state machine tying them together

pub mod capture;
pub mod machine;
pub mod record;
pub mod ring;
pub mod writer;

pub use capture::{CaptureBuffer, CapturedWindow};
pub use machine::{
    AcquisitionMachine, AcquisitionSettings, AcquisitionStats, FlushOutcome, FlushReport, Phase,
    CAPTURE_RESERVE, MARGIN_CAP,
};
pub use record::{Record, RecordHeader, Row};
pub use ring::PreRollRing;
pub use writer::{render_record, CsvRecordWriter, RecordWriter, COLUMN_HEADER};
