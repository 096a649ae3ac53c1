use std::sync::Arc;

use shared::calibration::CalibrationSet;
use shared::stand_hal::{
    ButtonStates, OperatorButton, SensorChannel, SensorInterface, SensorSnapshot, StandConfig,
};
use strum::IntoEnumIterator;
use tracing::warn;

use crate::actuators::ActuatorBank;
use crate::fault::FaultMonitor;
use crate::interlock::Interlock;
use crate::state_store::StateStore;

/// Sample and calibrate every channel into one timestamped snapshot.
pub fn acquire_snapshot(io: &mut dyn SensorInterface, cal: &CalibrationSet) -> SensorSnapshot {
    let mut snapshot = SensorSnapshot::zeroed();

    for channel in SensorChannel::iter() {
        let raw = match channel {
            // Load-cell output is noisy enough to be worth averaging a
            // few back-to-back samples before calibration.
            SensorChannel::Thrust => {
                let samples = cal.load_cell_samples();
                let mut sum = 0.0;
                for _ in 0..samples {
                    sum += io.sample_raw(channel);
                }
                sum / samples as f32
            }
            _ => io.sample_raw(channel),
        };

        snapshot.set_channel_value(channel, cal.calibrate(channel, raw));
    }

    snapshot.buttons = ButtonStates {
        vent: io.read_button(OperatorButton::Vent),
        heating: io.read_button(OperatorButton::Heating),
        ignition: io.read_button(OperatorButton::Ignition),
        feeding_valve: io.read_button(OperatorButton::FeedingValve),
        main_valve: io.read_button(OperatorButton::MainValve),
    };
    snapshot.timestamp_ms = (io.timestamp() * 1e3) as u64;

    snapshot
}

/// One acquisition cycle end to end: sample, calibrate, run the fault
/// monitor, then publish. The monitor runs synchronously inside the cycle
/// and before publication, so a forced safety transition is latched no
/// later than the snapshot that triggered it becomes visible.
pub struct SensingPipeline {
    calibration: CalibrationSet,
    monitor: FaultMonitor,
    store: Arc<StateStore>,
    interlock: Arc<Interlock>,
    actuators: Arc<ActuatorBank>,
}

impl SensingPipeline {
    pub fn new(
        config: &StandConfig,
        store: Arc<StateStore>,
        interlock: Arc<Interlock>,
        actuators: Arc<ActuatorBank>,
    ) -> Self {
        Self {
            calibration: CalibrationSet::new(&config.calibration),
            monitor: FaultMonitor::new(config.thresholds.clone()),
            store,
            interlock,
            actuators,
        }
    }

    pub fn cycle(&mut self, io: &mut dyn SensorInterface) -> SensorSnapshot {
        if self.interlock.take_reset_request() {
            self.monitor.reset();
        }

        let snapshot = acquire_snapshot(io, &self.calibration);

        if let Some(event) = self.monitor.evaluate(&snapshot) {
            // De-energize before anything else can observe the fault.
            self.actuators.safe_all();
            self.interlock.latch(event);
        }
        self.interlock.publish_conditions(self.monitor.conditions());

        if self.store.publish_snapshot(snapshot).is_err() {
            warn!("snapshot publish skipped, store lock contended");
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::stand_hal::{ActuatorChannel, FaultSeverity, StandConfig};
    use shared::stand_mock::MockStand;
    use std::time::Duration;

    fn pipeline_fixture(
        config: &StandConfig,
        stand: &MockStand,
    ) -> (SensingPipeline, shared::stand_mock::MockSensors) {
        let (sensors, actuators) = stand.split();
        let store = Arc::new(StateStore::new(Duration::from_millis(5)));
        let interlock = Arc::new(Interlock::new());
        let bank = Arc::new(ActuatorBank::new(
            Box::new(actuators),
            Duration::from_millis(5),
        ));

        (
            SensingPipeline::new(config, store, interlock, bank),
            sensors,
        )
    }

    #[test]
    fn snapshot_carries_calibrated_channels_and_buttons() {
        let mut config = StandConfig::default();
        config.calibration.adc_measured_v = config.calibration.adc_reference_v;

        let stand = MockStand::new();
        stand.set_raw(SensorChannel::AmbientTemperature, 0.75);
        stand.set_raw(SensorChannel::Thrust, config.calibration.load_cell.zero);
        stand.set_button(OperatorButton::Heating, true);
        stand.advance_time(1.5);

        let (mut pipeline, mut sensors) = pipeline_fixture(&config, &stand);
        let snapshot = pipeline.cycle(&mut sensors);

        assert_eq!(snapshot.timestamp_ms, 1500);
        assert!((snapshot.ambient_temperature_c - 25.0).abs() < 1e-3);
        assert!(snapshot.thrust_n.abs() < 1e-2);
        assert!(snapshot.buttons.heating);
        assert!(!snapshot.buttons.ignition);
    }

    #[test]
    fn hard_violation_deenergizes_before_latching() {
        let mut config = StandConfig::default();
        config.thresholds = vec![shared::stand_hal::ThresholdRule {
            channel: SensorChannel::ChamberPressure,
            limit: 60.0,
            severity: FaultSeverity::Critical,
            consecutive_samples: 3,
        }];

        let stand = MockStand::new();
        // 5 V over the 250 ohm sense resistor is 20 mA, top of the span.
        stand.set_raw(SensorChannel::ChamberPressure, 5.0);

        let (mut pipeline, mut sensors) = pipeline_fixture(&config, &stand);
        pipeline.actuators.set(ActuatorChannel::Igniter, true).unwrap();

        pipeline.cycle(&mut sensors);
        pipeline.cycle(&mut sensors);
        assert_eq!(pipeline.interlock.take(), None);
        assert!(stand.output(ActuatorChannel::Igniter));

        pipeline.cycle(&mut sensors);

        let event = pipeline.interlock.take().expect("interlock must latch");
        assert_eq!(event.severity, FaultSeverity::Critical);
        assert_eq!(event.channel, SensorChannel::ChamberPressure);
        assert!(!stand.output(ActuatorChannel::Igniter));
        assert_eq!(pipeline.interlock.conditions(), 0b1);

        // The triggering snapshot was still published after the latch.
        assert!(pipeline.store.latest_snapshot().unwrap().is_some());
    }
}
