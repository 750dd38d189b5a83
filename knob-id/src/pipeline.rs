//! Producer/consumer wiring between the presence signal and the acquisition
//! machine.
//!
//! ```text
//! ┌──────────────────┐  bounded(0)   ┌──────────────────────┐
//! │ presence-poller  │──────────────▶│ run_acquisition      │
//! │ (PresenceSignal) │ Result<bool>  │ (AcquisitionMachine) │
//! └──────────────────┘               └──────────────────────┘
//! ```
//!
//! The channel is a rendezvous: the poller cannot take a new reading until the
//! consumer has finished handling the previous one, including any flush.

use crate::acquisition::{AcquisitionMachine, AcquisitionStats, RecordWriter};
use crate::core::source::{PresenceSignal, SampleSource};
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Presence readings as seen by the consumer
pub type PresenceReceiver = Receiver<Result<bool>>;

/// Spawn the `presence-poller` thread.
///
/// The poller stops after forwarding a failed reading, when `running` is
/// cleared, or when the consumer hangs up. Its sender is dropped on exit so
/// the consumer sees a disconnect.
pub fn spawn_presence_poller<P>(
    mut presence: P,
    running: Arc<AtomicBool>,
) -> Result<(PresenceReceiver, JoinHandle<()>)>
where
    P: PresenceSignal + 'static,
{
    let (tx, rx) = bounded::<Result<bool>>(0);

    let handle = thread::Builder::new()
        .name("presence-poller".to_string())
        .spawn(move || {
            log::debug!("Presence poller started");
            while running.load(Ordering::Relaxed) {
                let reading = presence.read_presence();
                let failed = reading.is_err();
                if tx.send(reading).is_err() {
                    log::debug!("Acquisition loop hung up");
                    break;
                }
                if failed {
                    break;
                }
            }
            log::debug!("Presence poller stopped");
        })
        .map_err(|e| Error::Other(format!("Failed to spawn presence poller: {}", e)))?;

    Ok((rx, handle))
}

/// Feed presence readings to the machine until the poller disconnects.
///
/// A failed presence reading ends the run with [`Error::Presence`]. An event
/// still capturing when the poller disconnects is discarded.
pub fn run_acquisition<S, W>(
    machine: &mut AcquisitionMachine<S, W>,
    readings: &PresenceReceiver,
) -> Result<AcquisitionStats>
where
    S: SampleSource,
    W: RecordWriter,
{
    for reading in readings.iter() {
        let present = reading.map_err(|e| match e {
            Error::Presence(_) => e,
            other => Error::Presence(other.to_string()),
        })?;
        machine.on_presence(present);
    }

    let discarded = machine.abandon_event();
    if discarded > 0 {
        log::warn!(
            "Stopped during an event, {} captured samples discarded",
            discarded
        );
    }

    Ok(machine.stats().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{AcquisitionSettings, Phase, Record};
    use crate::core::types::{Axes, FullScale, Sample};
    use crossbeam_channel::unbounded;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Instant;

    struct CountingSource;

    impl SampleSource for CountingSource {
        fn read_sample(&mut self) -> Result<Sample> {
            Ok(Sample::new(Instant::now(), Axes::default(), Axes::default()))
        }
    }

    #[derive(Clone, Default)]
    struct SequenceLog(Arc<Mutex<Vec<u32>>>);

    impl RecordWriter for SequenceLog {
        fn write(&mut self, record: &Record) -> Result<PathBuf> {
            self.0.lock().unwrap().push(record.header.sequence);
            Ok(PathBuf::from("unused"))
        }
    }

    fn machine(writer: SequenceLog) -> AcquisitionMachine<CountingSource, SequenceLog> {
        AcquisitionMachine::new(
            AcquisitionSettings {
                name: "event".to_string(),
                full_scale: FullScale::default(),
                margin: 2,
            },
            CountingSource,
            writer,
        )
    }

    /// Replays readings, then fails
    struct ScriptedPresence(Vec<bool>);

    impl PresenceSignal for ScriptedPresence {
        fn read_presence(&mut self) -> Result<bool> {
            if self.0.is_empty() {
                return Err(Error::Bus("NoAcknowledge".to_string()));
            }
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn test_events_flushed_in_order() {
        let (tx, rx) = unbounded();
        for present in [false, true, true, false, false, true, false] {
            tx.send(Ok(present)).unwrap();
        }
        drop(tx);

        let writer = SequenceLog::default();
        let mut machine = machine(writer.clone());
        let stats = run_acquisition(&mut machine, &rx).unwrap();

        assert_eq!(stats.events, 2);
        assert_eq!(*writer.0.lock().unwrap(), vec![0, 1]);
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn test_presence_failure_is_fatal() {
        let (tx, rx) = unbounded();
        tx.send(Ok(true)).unwrap();
        tx.send(Err(Error::Bus("ArbitrationLoss".to_string())))
            .unwrap();
        tx.send(Ok(false)).unwrap();
        drop(tx);

        let writer = SequenceLog::default();
        let mut machine = machine(writer.clone());
        let result = run_acquisition(&mut machine, &rx);

        assert!(matches!(result, Err(Error::Presence(_))));
        assert!(writer.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disconnect_discards_open_event() {
        let (tx, rx) = unbounded();
        tx.send(Ok(true)).unwrap();
        tx.send(Ok(true)).unwrap();
        drop(tx);

        let writer = SequenceLog::default();
        let mut machine = machine(writer.clone());
        let stats = run_acquisition(&mut machine, &rx).unwrap();

        assert_eq!(stats.events, 0);
        assert_eq!(machine.phase(), Phase::Idle);
        assert!(writer.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_poller_stops_after_failure() {
        let running = Arc::new(AtomicBool::new(true));
        let (rx, handle) =
            spawn_presence_poller(ScriptedPresence(vec![false, true]), running).unwrap();

        let readings: Vec<Result<bool>> = rx.iter().collect();
        handle.join().unwrap();

        assert_eq!(readings.len(), 3);
        assert!(matches!(readings[0], Ok(false)));
        assert!(matches!(readings[1], Ok(true)));
        assert!(readings[2].is_err());
    }

    #[test]
    fn test_poller_stops_when_cleared() {
        struct Idle;
        impl PresenceSignal for Idle {
            fn read_presence(&mut self) -> Result<bool> {
                Ok(false)
            }
        }

        let running = Arc::new(AtomicBool::new(true));
        let (rx, handle) = spawn_presence_poller(Idle, Arc::clone(&running)).unwrap();

        for _ in 0..5 {
            assert!(matches!(rx.recv(), Ok(Ok(false))));
        }
        running.store(false, Ordering::Relaxed);

        // At most one reading was in flight when the flag was cleared
        let remaining = rx.iter().count();
        assert!(remaining <= 1);
        handle.join().unwrap();
    }

    #[test]
    fn test_end_to_end_through_poller() {
        let running = Arc::new(AtomicBool::new(true));
        let presence = ScriptedPresence(vec![false, false, true, true, false]);
        let (rx, handle) = spawn_presence_poller(presence, running).unwrap();

        let writer = SequenceLog::default();
        let mut machine = machine(writer.clone());
        let result = run_acquisition(&mut machine, &rx);
        handle.join().unwrap();

        // Script exhaustion surfaces as a presence failure after the event
        assert!(matches!(result, Err(Error::Presence(_))));
        assert_eq!(*writer.0.lock().unwrap(), vec![0]);
    }
}
