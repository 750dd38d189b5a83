//! knob-id - Presence-triggered acquisition daemon
//!
//! ```text
//! presence-poller ──bounded(0)──▶ acquisition loop ──▶ <dir>/<name>a<g>w<dps>_<seq>.csv
//! ```
//!
//! Runs until Ctrl-C or a presence signal failure. The latter exits non-zero.

use clap::Parser;
use knob_id::acquisition::{AcquisitionMachine, AcquisitionSettings, CsvRecordWriter};
use knob_id::devices::{create_devices, DeviceSet};
use knob_id::error::Error;
use knob_id::pipeline::{run_acquisition, spawn_presence_poller};
use knob_id::{Config, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Presence-triggered MPU-9250 acquisition
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Acquisition name, used as record file prefix
    #[arg(long)]
    name: Option<String>,

    /// Output directory for records
    #[arg(long)]
    dir: Option<String>,

    /// Accelerometer full scale in g (2, 4, 8, 16)
    #[arg(long)]
    acc: Option<u16>,

    /// Gyroscope full scale in °/s (250, 500, 1000, 2000)
    #[arg(long)]
    gyro: Option<u16>,

    /// Samples kept before and after each event (0..=1000)
    #[arg(long, allow_negative_numbers = true)]
    marg: Option<i64>,

    /// Do not write the metadata header block
    #[arg(long)]
    nohd: bool,

    /// Device type override ("mpu9250" or "mock")
    #[arg(long)]
    device: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(name) = &self.name {
            config.acquisition.name = name.clone();
        }
        if let Some(dir) = &self.dir {
            config.acquisition.output_dir = dir.clone();
        }
        if let Some(acc) = self.acc {
            config.sensor.accel_fs = acc;
        }
        if let Some(gyro) = self.gyro {
            config.sensor.gyro_fs = gyro;
        }
        if let Some(marg) = self.marg {
            config.acquisition.margin = marg;
        }
        if self.nohd {
            config.acquisition.no_header = true;
        }
        if let Some(device) = &self.device {
            config.device.device_type = device.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("knob-id v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        log::info!("Using config: {}", path.display());
    }

    let settings = AcquisitionSettings {
        name: config.acquisition.name.clone(),
        full_scale: config.full_scale(),
        margin: config.margin(),
    };
    log::info!(
        "Acquisition '{}': accel {}, gyro {}, margin {}",
        settings.name,
        settings.full_scale.accel,
        settings.full_scale.gyro,
        settings.margin
    );

    let output_dir = &config.acquisition.output_dir;
    fs::create_dir_all(output_dir).map_err(|e| {
        Error::Other(format!("Failed to create output dir {}: {}", output_dir, e))
    })?;
    let writer = CsvRecordWriter::new(output_dir, !config.acquisition.no_header);
    let first_sequence = writer.next_free_sequence(&settings.name, settings.full_scale)?;
    if first_sequence > 0 {
        log::info!(
            "Existing records in {}, continuing at number {}",
            output_dir,
            first_sequence
        );
    }

    log::info!("Device: {}", config.device.device_type);
    let DeviceSet { source, presence } = create_devices(&config)?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let (readings, poller) = spawn_presence_poller(presence, Arc::clone(&running))?;
    let mut machine =
        AcquisitionMachine::new(settings, source, writer).with_first_sequence(first_sequence);

    log::info!("Waiting for presence. Press Ctrl-C to stop.");
    let result = run_acquisition(&mut machine, &readings);

    // Unblock the poller if the loop ended on an error
    running.store(false, Ordering::Relaxed);
    drop(readings);
    if poller.join().is_err() {
        log::error!("Presence poller panicked");
    }

    let stats = result?;
    log::info!(
        "Stopped: {} events, {} written, {} dropped, {} samples skipped",
        stats.events,
        stats.records_written,
        stats.records_dropped,
        stats.skipped_reads
    );
    Ok(())
}
