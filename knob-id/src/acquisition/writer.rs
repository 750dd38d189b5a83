//! Record persistence
//!
//! One semicolon-delimited text file per event:
//!
//! ```text
//! ##########
//! # 2024-05-02 10:41:07 Data Acquisition
//! # Acquisition name: event
//! # Acquisition num: 3
//! # Accelerometer full scale: 2 (16384)
//! # Gyroscope full scale: 250 (131)
//! # Margin: 250 (pre-roll 250)
//! ##########
//! num; time(us); accX(g); accY(g); accZ(g); gyrX(o/s); gyrY(o/s); gyrZ(o/s); p
//! 1;0;0.0012;-0.0009;1.0021;0.2137;-0.0916;0.0153;0
//! ```
//!
//! The whole file is rendered in memory first, written next to its final
//! name and renamed into place, so a failed write never leaves a partial
//! record behind. Existing records are never replaced.

use super::record::Record;
use crate::core::types::FullScale;
use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of record files
pub const RECORD_EXTENSION: &str = "csv";

/// Column header line (always written)
pub const COLUMN_HEADER: &str =
    "num; time(us); accX(g); accY(g); accZ(g); gyrX(o/s); gyrY(o/s); gyrZ(o/s); p";

const BANNER: &str = "##########";

/// Persists finalized records
///
/// Implementations get a read-only view for the duration of the call and must
/// not keep it. Returns where the record ended up.
pub trait RecordWriter: Send {
    fn write(&mut self, record: &Record) -> Result<PathBuf>;
}

impl<T: RecordWriter + ?Sized> RecordWriter for Box<T> {
    fn write(&mut self, record: &Record) -> Result<PathBuf> {
        (**self).write(record)
    }
}

/// Render a record to its text form
pub fn render_record<W: fmt::Write>(
    out: &mut W,
    record: &Record,
    include_header: bool,
) -> fmt::Result {
    let header = &record.header;
    let accel_div = header.full_scale.accel.divisor();
    let gyro_div = header.full_scale.gyro.divisor();

    if include_header {
        writeln!(out, "{}", BANNER)?;
        writeln!(
            out,
            "# {} Data Acquisition",
            header.created.format("%Y-%m-%d %H:%M:%S%.3f %:z")
        )?;
        writeln!(out, "# Acquisition name: {}", header.name)?;
        writeln!(out, "# Acquisition num: {}", header.sequence)?;
        writeln!(
            out,
            "# Accelerometer full scale: {} ({})",
            header.full_scale.accel.g(),
            accel_div
        )?;
        writeln!(
            out,
            "# Gyroscope full scale: {} ({})",
            header.full_scale.gyro.dps(),
            gyro_div
        )?;
        writeln!(
            out,
            "# Margin: {} (pre-roll {})",
            header.margin, header.pre_roll_len
        )?;
        writeln!(out, "{}", BANNER)?;
    }
    writeln!(out, "{}", COLUMN_HEADER)?;

    for row in &record.rows {
        let [ax, ay, az] = row.accel.scaled(accel_div);
        let [gx, gy, gz] = row.gyro.scaled(gyro_div);
        writeln!(
            out,
            "{};{};{:.4};{:.4};{:.4};{:.4};{:.4};{:.4};{}",
            row.num,
            row.offset_us,
            ax,
            ay,
            az,
            gx,
            gy,
            gz,
            u8::from(row.post_roll)
        )?;
    }
    Ok(())
}

/// Record file name, e.g. `eventa2w250_03.csv`
pub fn record_file_name(name: &str, full_scale: FullScale, sequence: u32) -> String {
    format!(
        "{}{}_{:02}.{}",
        name,
        full_scale.tag(),
        sequence,
        RECORD_EXTENSION
    )
}

/// Writes each record to `<dir>/<name><tag>_<seq>.csv`
///
/// Never replaces an existing file: a record whose name is taken is rejected.
pub struct CsvRecordWriter {
    dir: PathBuf,
    include_header: bool,
}

impl CsvRecordWriter {
    pub fn new(dir: impl AsRef<Path>, include_header: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            include_header,
        }
    }

    /// Final path for a record, e.g. `data/eventa2w250_03.csv`
    pub fn path_for(&self, record: &Record) -> PathBuf {
        let header = &record.header;
        self.dir
            .join(record_file_name(&header.name, header.full_scale, header.sequence))
    }

    /// First sequence number with no record of this name in the output
    /// directory, so a new run continues after the previous one.
    pub fn next_free_sequence(&self, name: &str, full_scale: FullScale) -> Result<u32> {
        let prefix = format!("{}{}_", name, full_scale.tag());
        let suffix = format!(".{}", RECORD_EXTENSION);

        let mut next = 0;
        for entry in fs::read_dir(&self.dir)? {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let sequence = file_name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(&suffix))
                .filter(|digits| {
                    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                })
                .and_then(|digits| digits.parse::<u32>().ok());
            if let Some(sequence) = sequence {
                next = next.max(sequence.saturating_add(1));
            }
        }
        Ok(next)
    }
}

impl RecordWriter for CsvRecordWriter {
    fn write(&mut self, record: &Record) -> Result<PathBuf> {
        let path = self.path_for(record);
        let taken = path
            .try_exists()
            .map_err(|e| Error::Record(format!("cannot check {}: {}", path.display(), e)))?;
        if taken {
            return Err(Error::Record(format!(
                "{} already exists, not overwriting",
                path.display()
            )));
        }

        // ~70 bytes per row
        let mut contents = String::with_capacity(512 + record.rows.len() * 72);
        render_record(&mut contents, record, self.include_header)
            .map_err(|e| Error::Record(format!("failed to render record: {}", e)))?;

        let staging = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));
        if let Err(e) = fs::write(&staging, contents.as_bytes()) {
            let _ = fs::remove_file(&staging);
            return Err(Error::Record(format!(
                "failed to write {}: {}",
                staging.display(),
                e
            )));
        }
        fs::rename(&staging, &path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            Error::Record(format!("failed to publish {}: {}", path.display(), e))
        })?;

        log::debug!(
            "Wrote {} rows ({} bytes) to {}",
            record.len(),
            contents.len(),
            path.display()
        );
        Ok(path)
    }
}
