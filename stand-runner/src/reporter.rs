use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use shared::stand_hal::{ControlStatus, SensorSnapshot};
use tracing::warn;

use tsc_rs::messages::MessageBoard;
use tsc_rs::state_store::StateStore;

/// Periodic ground-link reporter: reads the latest snapshot and status
/// from the store, appends the drained message field, and writes one
/// delimited record per period to the sink. The field order and encoding
/// are owned here, not by the control core.
pub fn reporter_task(
    store: Arc<StateStore>,
    messages: Arc<MessageBoard>,
    mut sink: Box<dyn Write + Send>,
    period: Duration,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::Relaxed) {
        let snapshot = match store.latest_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            // Nothing sampled yet, or a contended lock; skip this send.
            Ok(None) => {
                thread::sleep(period);
                continue;
            }
            Err(_) => {
                warn!("telemetry read skipped, store lock contended");
                thread::sleep(period);
                continue;
            }
        };

        let status = match store.latest_status() {
            Ok(status) => status,
            Err(_) => {
                warn!("telemetry read skipped, store lock contended");
                thread::sleep(period);
                continue;
            }
        };

        // The message field clears on every send, whether or not the
        // write itself succeeds; a broken link must not replay stale
        // operator messages later.
        let message = messages.drain();
        if let Err(err) = write_record(&mut sink, &snapshot, &status, &message) {
            warn!(%err, "telemetry write failed");
        }

        thread::sleep(period);
    }
}

fn write_record(
    sink: &mut dyn Write,
    snapshot: &SensorSnapshot,
    status: &ControlStatus,
    message: &str,
) -> io::Result<()> {
    writeln!(
        sink,
        "d,{},{:.2},{:.2},{:.2},{:.2},{:.1},{:.1},{:.1},{:.1},{:.1},{},{},{},{},{},{},{},{:?},{:?},{},{}",
        snapshot.timestamp_ms,
        snapshot.feeding_pressure_bar,
        snapshot.line_pressure_bar,
        snapshot.chamber_pressure_bar,
        snapshot.thrust_n,
        snapshot.bottle_temperature_c,
        snapshot.injector_temperature_c,
        snapshot.nozzle_temperature_c,
        snapshot.ambient_temperature_c,
        snapshot.plume_temperature_c,
        u8::from(snapshot.buttons.vent),
        u8::from(snapshot.buttons.heating),
        u8::from(snapshot.buttons.ignition),
        u8::from(snapshot.buttons.feeding_valve),
        u8::from(snapshot.buttons.main_valve),
        u8::from(status.igniter_on),
        u8::from(status.main_valve_open),
        status.mode,
        status.firing_state,
        status.conditions,
        message,
    )?;
    sink.flush()
}
