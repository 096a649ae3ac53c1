use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use shared::calibration::{CalibrationConfig, LinearModel};
use shared::stand_hal::{
    ActuatorChannel, ActuatorInterface, OperatorButton, SensorChannel, SensorInterface,
};
use strum::EnumCount;

/// Lumped plant model for dry runs without stand hardware: enough
/// dynamics that heating raises tank pressure, opening valves feeds the
/// chamber, and a firing produces thrust and nozzle heat.
struct Plant {
    last_step: Instant,
    feeding_bar: f32,
    line_bar: f32,
    chamber_bar: f32,
    bottle_c: f32,
    nozzle_c: f32,
    buttons: [bool; OperatorButton::COUNT],
    outputs: [bool; ActuatorChannel::COUNT],
}

impl Plant {
    fn step(&mut self) {
        let dt = self.last_step.elapsed().as_secs_f32();
        if dt <= 0.0 {
            return;
        }
        self.last_step = Instant::now();

        let heater = self.outputs[ActuatorChannel::Heater.index()];
        let vent = self.outputs[ActuatorChannel::DumpValve.index()];
        let main_open = self.outputs[ActuatorChannel::MainValve.index()];
        let igniter = self.outputs[ActuatorChannel::Igniter.index()];

        self.bottle_c += if heater { 1.5 * dt } else { (20.0 - self.bottle_c) * 0.02 * dt };

        // Tank pressure tracks bottle temperature, bleeds when venting.
        let target_feeding = if vent { 0.0 } else { 8.0 + 0.6 * self.bottle_c };
        self.feeding_bar += (target_feeding - self.feeding_bar) * 0.5 * dt;

        let target_line = if main_open { self.feeding_bar } else { 0.0 };
        self.line_bar += (target_line - self.line_bar) * 2.0 * dt;

        let target_chamber = if main_open && (igniter || self.chamber_bar > 1.0) {
            0.6 * self.feeding_bar
        } else {
            0.0
        };
        self.chamber_bar += (target_chamber - self.chamber_bar) * 1.5 * dt;

        let target_nozzle = if self.chamber_bar > 2.0 { 600.0 } else { 20.0 };
        self.nozzle_c += (target_nozzle - self.nozzle_c) * 0.2 * dt;
    }

    fn thrust_n(&self) -> f32 {
        self.chamber_bar * 12.0
    }
}

pub struct SimStand {
    start: Instant,
    inner: Arc<Mutex<Plant>>,
    calibration: CalibrationConfig,
}

pub struct SimSensors {
    start: Instant,
    inner: Arc<Mutex<Plant>>,
    calibration: CalibrationConfig,
}

pub struct SimActuators {
    inner: Arc<Mutex<Plant>>,
}

impl SimStand {
    pub fn new(calibration: CalibrationConfig) -> Self {
        Self {
            start: Instant::now(),
            inner: Arc::new(Mutex::new(Plant {
                last_step: Instant::now(),
                feeding_bar: 8.0,
                line_bar: 0.0,
                chamber_bar: 0.0,
                bottle_c: 20.0,
                nozzle_c: 20.0,
                buttons: [false; OperatorButton::COUNT],
                outputs: [false; ActuatorChannel::COUNT],
            })),
            calibration,
        }
    }

    pub fn split(&self) -> (SimSensors, SimActuators) {
        (
            SimSensors {
                start: self.start,
                inner: self.inner.clone(),
                calibration: self.calibration,
            },
            SimActuators {
                inner: self.inner.clone(),
            },
        )
    }

    pub fn set_button(&self, button: OperatorButton, pressed: bool) {
        self.lock().buttons[button.index()] = pressed;
    }

    fn lock(&self) -> MutexGuard<'_, Plant> {
        self.inner.lock().expect("sim plant lock poisoned")
    }
}

impl SimSensors {
    /// Raw pin voltage that calibrates back to the given engineering
    /// value: the inverse of the channel's linear model, un-corrected for
    /// the measured ADC reference.
    fn raw_for(&self, channel: SensorChannel, engineering: f32) -> f32 {
        let cal = &self.calibration;

        let model = match channel {
            SensorChannel::FeedingPressure => LinearModel::from_span(cal.voltage_pressure),
            SensorChannel::LinePressure | SensorChannel::ChamberPressure => {
                LinearModel::from_span(cal.current_pressure)
            }
            SensorChannel::Thrust => LinearModel::from_span(cal.load_cell),
            SensorChannel::PlumeTemperature => cal.infra_red,
            SensorChannel::IgnitionGround => LinearModel::identity(),
            _ => cal.temperature,
        };

        let raw = (engineering - model.offset) / model.slope;

        let raw_v = match channel {
            SensorChannel::LinePressure | SensorChannel::ChamberPressure => {
                // The model lives in the milliamp domain; the pin sees
                // the drop across the sense resistor.
                raw / 1000.0 * cal.sense_resistance_ohm
            }
            _ => raw,
        };

        raw_v / (cal.adc_measured_v / cal.adc_reference_v)
    }
}

impl SensorInterface for SimSensors {
    fn timestamp(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    fn sample_raw(&mut self, channel: SensorChannel) -> f32 {
        let mut plant = self.inner.lock().expect("sim plant lock poisoned");
        plant.step();

        let engineering = match channel {
            SensorChannel::FeedingPressure => plant.feeding_bar,
            SensorChannel::LinePressure => plant.line_bar,
            SensorChannel::ChamberPressure => plant.chamber_bar,
            SensorChannel::Thrust => plant.thrust_n(),
            SensorChannel::BottleTemperature => plant.bottle_c,
            SensorChannel::InjectorTemperature => plant.bottle_c,
            SensorChannel::NozzleTemperature => plant.nozzle_c,
            SensorChannel::AmbientTemperature => 20.0,
            SensorChannel::PlumeTemperature => plant.nozzle_c,
            SensorChannel::IgnitionGround => 0.0,
        };
        drop(plant);

        self.raw_for(channel, engineering)
    }

    fn read_button(&mut self, button: OperatorButton) -> bool {
        self.inner.lock().expect("sim plant lock poisoned").buttons[button.index()]
    }
}

impl ActuatorInterface for SimActuators {
    fn set_output(&mut self, actuator: ActuatorChannel, state: bool) {
        self.inner.lock().expect("sim plant lock poisoned").outputs[actuator.index()] = state;
    }

    fn read_output(&self, actuator: ActuatorChannel) -> bool {
        self.inner.lock().expect("sim plant lock poisoned").outputs[actuator.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::calibration::CalibrationSet;

    #[test]
    fn raw_values_round_trip_through_calibration() {
        let config = CalibrationConfig::default();
        let cal = CalibrationSet::new(&config);
        let sim = SimStand::new(config);
        let (mut sensors, _) = sim.split();

        let raw = sensors.sample_raw(SensorChannel::FeedingPressure);
        let pressure = cal.calibrate(SensorChannel::FeedingPressure, raw);
        assert!((pressure - 8.0).abs() < 0.5);

        let raw = sensors.sample_raw(SensorChannel::BottleTemperature);
        let temperature = cal.calibrate(SensorChannel::BottleTemperature, raw);
        assert!((temperature - 20.0).abs() < 0.5);
    }

    #[test]
    fn heater_warms_the_bottle() {
        let sim = SimStand::new(CalibrationConfig::default());
        let (mut sensors, mut actuators) = sim.split();

        actuators.set_output(ActuatorChannel::Heater, true);
        let before = sensors.sample_raw(SensorChannel::BottleTemperature);
        std::thread::sleep(std::time::Duration::from_millis(50));
        let after = sensors.sample_raw(SensorChannel::BottleTemperature);

        assert!(after > before);
    }
}
