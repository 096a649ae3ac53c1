use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use shared::stand_hal::{SensorInterface, StandCommand};
use tracing::warn;

use crate::sensing::SensingPipeline;
use crate::Tsc;

/// Fixed-period acquisition loop. One snapshot per period; if a cycle
/// overruns, the missed periods are skipped rather than run back to back.
pub fn sensing_task(
    mut io: Box<dyn SensorInterface>,
    mut pipeline: SensingPipeline,
    period: Duration,
    running: Arc<AtomicBool>,
) {
    let mut next_cycle = Instant::now() + period;

    while running.load(Ordering::Relaxed) {
        pipeline.cycle(io.as_mut());
        wait_for_next_tick(&mut next_cycle, period, "sensing");
    }
}

/// Fixed-period control loop: feed the controller the newest snapshot and
/// any queued operator commands, then advance it by the measured elapsed
/// time so a late tick catches up instead of stretching the timeline.
pub fn control_task(
    mut tsc: Tsc,
    commands: mpsc::Receiver<StandCommand>,
    period: Duration,
    running: Arc<AtomicBool>,
) {
    let mut next_cycle = Instant::now() + period;
    let mut last_tick = Instant::now();

    while running.load(Ordering::Relaxed) {
        let queued: Vec<StandCommand> = commands.try_iter().collect();

        match tsc.store.latest_snapshot() {
            Ok(Some(snapshot)) => tsc.ingest_snapshot(snapshot),
            Ok(None) => {}
            Err(_) => warn!("snapshot read skipped, store lock contended"),
        }

        let dt = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        tsc.update(dt, &queued);

        wait_for_next_tick(&mut next_cycle, period, "control");
    }

    // Leave the stand de-energized whenever the process goes down.
    tsc.actuators.safe_all();
}

fn wait_for_next_tick(next_cycle: &mut Instant, period: Duration, task: &str) {
    let now = Instant::now();

    if now < *next_cycle {
        thread::sleep(*next_cycle - now);
        *next_cycle += period;
        return;
    }

    // Overran the deadline; drop whole periods so the loop never runs
    // reentrant or back to back.
    let mut skipped: u32 = 0;
    while *next_cycle <= now {
        *next_cycle += period;
        skipped += 1;
    }
    warn!(task, skipped, "cycle overran its period");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::ActuatorBank;
    use crate::interlock::Interlock;
    use crate::messages::MessageBoard;
    use crate::state_store::StateStore;
    use shared::stand_hal::{Mode, StandConfig};
    use shared::stand_mock::MockStand;

    #[test]
    fn tasks_publish_and_stop_cleanly() {
        let config = StandConfig::default();
        let stand = MockStand::new();
        let (sensors, actuators) = stand.split();

        let store = Arc::new(StateStore::new(Duration::from_millis(5)));
        let interlock = Arc::new(Interlock::new());
        let messages = Arc::new(MessageBoard::new());
        let bank = Arc::new(ActuatorBank::new(
            Box::new(actuators),
            Duration::from_millis(5),
        ));

        let pipeline =
            SensingPipeline::new(&config, store.clone(), interlock.clone(), bank.clone());
        let tsc = Tsc::new(
            config,
            bank.clone(),
            store.clone(),
            interlock.clone(),
            messages.clone(),
        );

        let running = Arc::new(AtomicBool::new(true));
        let (_tx, rx) = mpsc::channel();

        let sensing_running = running.clone();
        let sensing = thread::spawn(move || {
            sensing_task(
                Box::new(sensors),
                pipeline,
                Duration::from_millis(1),
                sensing_running,
            );
        });

        let control_running = running.clone();
        let control = thread::spawn(move || {
            control_task(tsc, rx, Duration::from_millis(1), control_running);
        });

        thread::sleep(Duration::from_millis(50));
        running.store(false, Ordering::Relaxed);
        sensing.join().expect("sensing task panicked");
        control.join().expect("control task panicked");

        assert!(store.latest_snapshot().unwrap().is_some());
        assert_eq!(store.latest_status().unwrap().mode, Mode::Init);
    }

    #[test]
    fn overrun_skips_whole_periods() {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let mut next_cycle = start + period;

        // Simulate a cycle that blew through three periods.
        thread::sleep(Duration::from_millis(35));
        wait_for_next_tick(&mut next_cycle, period, "test");

        assert!(next_cycle > Instant::now());
        assert!(next_cycle <= Instant::now() + period);
    }
}
