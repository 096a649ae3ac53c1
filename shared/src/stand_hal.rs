use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

use crate::calibration::CalibrationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum Mode {
    Init,
    Test,
    Wait,
    Heating,
    Sequence,
    Safe,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum FiringState {
    AllOff,
    IgnitOn,
    ValveOn,
    IgnitOff,
    ValveOff,
    Finished,
}

/// Every analog channel the acquisition task samples each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter, Hash)]
pub enum SensorChannel {
    FeedingPressure,
    LinePressure,
    ChamberPressure,
    Thrust,
    BottleTemperature,
    InjectorTemperature,
    NozzleTemperature,
    AmbientTemperature,
    PlumeTemperature,
    IgnitionGround,
}

impl SensorChannel {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter)]
pub enum ActuatorChannel {
    Igniter,
    MainValve,
    DumpValve,
    FeedingValve,
    Heater,
}

impl ActuatorChannel {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter)]
pub enum OperatorButton {
    Vent,
    Heating,
    Ignition,
    FeedingValve,
    MainValve,
}

impl OperatorButton {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Raw operator-button states carried inside each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonStates {
    pub vent: bool,
    pub heating: bool,
    pub ignition: bool,
    pub feeding_valve: bool,
    pub main_valve: bool,
}

impl ButtonStates {
    pub fn get(&self, button: OperatorButton) -> bool {
        match button {
            OperatorButton::Vent => self.vent,
            OperatorButton::Heating => self.heating,
            OperatorButton::Ignition => self.ignition,
            OperatorButton::FeedingValve => self.feeding_valve,
            OperatorButton::MainValve => self.main_valve,
        }
    }

    pub fn set(&mut self, button: OperatorButton, state: bool) {
        match button {
            OperatorButton::Vent => self.vent = state,
            OperatorButton::Heating => self.heating = state,
            OperatorButton::Ignition => self.ignition = state,
            OperatorButton::FeedingValve => self.feeding_valve = state,
            OperatorButton::MainValve => self.main_valve = state,
        }
    }
}

/// One fully calibrated acquisition cycle. Built once per sampling period
/// and never mutated afterwards; the next cycle supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub timestamp_ms: u64,
    pub feeding_pressure_bar: f32,
    pub line_pressure_bar: f32,
    pub chamber_pressure_bar: f32,
    pub thrust_n: f32,
    pub bottle_temperature_c: f32,
    pub injector_temperature_c: f32,
    pub nozzle_temperature_c: f32,
    pub ambient_temperature_c: f32,
    pub plume_temperature_c: f32,
    pub ignition_ground_v: f32,
    pub buttons: ButtonStates,
}

impl SensorSnapshot {
    pub fn zeroed() -> Self {
        Self {
            timestamp_ms: 0,
            feeding_pressure_bar: 0.0,
            line_pressure_bar: 0.0,
            chamber_pressure_bar: 0.0,
            thrust_n: 0.0,
            bottle_temperature_c: 0.0,
            injector_temperature_c: 0.0,
            nozzle_temperature_c: 0.0,
            ambient_temperature_c: 0.0,
            plume_temperature_c: 0.0,
            ignition_ground_v: 0.0,
            buttons: ButtonStates::default(),
        }
    }

    /// Calibrated value for a channel, for threshold rules that are
    /// configured against a typed channel id rather than a field name.
    pub fn channel_value(&self, channel: SensorChannel) -> f32 {
        match channel {
            SensorChannel::FeedingPressure => self.feeding_pressure_bar,
            SensorChannel::LinePressure => self.line_pressure_bar,
            SensorChannel::ChamberPressure => self.chamber_pressure_bar,
            SensorChannel::Thrust => self.thrust_n,
            SensorChannel::BottleTemperature => self.bottle_temperature_c,
            SensorChannel::InjectorTemperature => self.injector_temperature_c,
            SensorChannel::NozzleTemperature => self.nozzle_temperature_c,
            SensorChannel::AmbientTemperature => self.ambient_temperature_c,
            SensorChannel::PlumeTemperature => self.plume_temperature_c,
            SensorChannel::IgnitionGround => self.ignition_ground_v,
        }
    }

    pub fn set_channel_value(&mut self, channel: SensorChannel, value: f32) {
        match channel {
            SensorChannel::FeedingPressure => self.feeding_pressure_bar = value,
            SensorChannel::LinePressure => self.line_pressure_bar = value,
            SensorChannel::ChamberPressure => self.chamber_pressure_bar = value,
            SensorChannel::Thrust => self.thrust_n = value,
            SensorChannel::BottleTemperature => self.bottle_temperature_c = value,
            SensorChannel::InjectorTemperature => self.injector_temperature_c = value,
            SensorChannel::NozzleTemperature => self.nozzle_temperature_c = value,
            SensorChannel::AmbientTemperature => self.ambient_temperature_c = value,
            SensorChannel::PlumeTemperature => self.plume_temperature_c = value,
            SensorChannel::IgnitionGround => self.ignition_ground_v = value,
        }
    }
}

/// Commanded state of the control side, published once per control tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlStatus {
    pub timestamp_ms: u64,
    pub mode: Mode,
    pub firing_state: FiringState,
    pub igniter_on: bool,
    pub main_valve_open: bool,
    pub dump_valve_open: bool,
    pub feeding_valve_open: bool,
    pub heater_on: bool,
    /// Latched fault-condition bitmask, one bit per threshold rule.
    pub conditions: u32,
}

impl ControlStatus {
    pub fn startup() -> Self {
        Self {
            timestamp_ms: 0,
            mode: Mode::Init,
            firing_state: FiringState::AllOff,
            igniter_on: false,
            main_valve_open: false,
            dump_valve_open: false,
            feeding_valve_open: false,
            heater_on: false,
            conditions: 0,
        }
    }
}

/// Explicit external commands. Operator buttons arrive through the sensor
/// snapshot instead; these are the out-of-band ground-side requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandCommand {
    Reset,
    Abort,
    StartTest,
    EndTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultSeverity {
    /// Forces the stand into `Mode::Safe`.
    Warning,
    /// Forces the stand into `Mode::Shutdown`; terminal for the run.
    Critical,
}

/// A threshold rule fires only after `consecutive_samples` violating
/// samples in a row; any in-range sample resets its counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub channel: SensorChannel,
    pub limit: f32,
    pub severity: FaultSeverity,
    pub consecutive_samples: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandConfig {
    pub sampling_period_ms: u64,
    pub control_period_ms: u64,
    pub telemetry_period_ms: u64,
    pub lock_timeout_ms: u64,
    pub sensor_settle_s: f32,
    pub safe_press_s: f32,
    pub minimum_firing_pressure_bar: f32,
    pub tank_temperature_limit_c: f32,
    pub sequence: SequenceConfig,
    pub thresholds: Vec<ThresholdRule>,
    pub calibration: CalibrationConfig,
}

/// Timing inputs the firing schedule is derived from. All values are
/// stand configuration, not physical truth; defaults are bench values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Time from the ignition signal to the igniter actually lighting.
    pub igniter_delay_s: f32,
    /// How long the igniter charge burns.
    pub igniter_burn_s: f32,
    /// Target main burn duration, valves open to valves closed.
    pub burn_duration_s: f32,
    /// Wait after valve close before the run is declared finished.
    pub cooldown_s: f32,
}

impl SequenceConfig {
    pub fn default() -> Self {
        Self {
            igniter_delay_s: 0.05,
            igniter_burn_s: 0.9,
            burn_duration_s: 7.0,
            cooldown_s: 10.0,
        }
    }
}

impl StandConfig {
    pub fn default() -> Self {
        Self {
            sampling_period_ms: 10,
            control_period_ms: 10,
            telemetry_period_ms: 20,
            lock_timeout_ms: 5,
            sensor_settle_s: 2.0,
            safe_press_s: 1.0,
            minimum_firing_pressure_bar: 5.0,
            tank_temperature_limit_c: 35.0,
            sequence: SequenceConfig::default(),
            thresholds: vec![
                ThresholdRule {
                    channel: SensorChannel::FeedingPressure,
                    limit: 60.0,
                    severity: FaultSeverity::Warning,
                    consecutive_samples: 5,
                },
                ThresholdRule {
                    channel: SensorChannel::FeedingPressure,
                    limit: 65.0,
                    severity: FaultSeverity::Critical,
                    consecutive_samples: 5,
                },
                ThresholdRule {
                    channel: SensorChannel::ChamberPressure,
                    limit: 60.0,
                    severity: FaultSeverity::Critical,
                    consecutive_samples: 5,
                },
                ThresholdRule {
                    channel: SensorChannel::NozzleTemperature,
                    limit: 800.0,
                    severity: FaultSeverity::Critical,
                    consecutive_samples: 5,
                },
            ],
            calibration: CalibrationConfig::default(),
        }
    }
}

/// Sampling side of the stand hardware. Owned exclusively by the
/// acquisition task; never shared.
pub trait SensorInterface: Send {
    /// Monotonic seconds since boot.
    fn timestamp(&self) -> f32;

    /// Voltage at the ADC pin for an analog channel, scaled against the
    /// nominal reference (reference correction and engineering-unit
    /// conversion happen above this).
    fn sample_raw(&mut self, channel: SensorChannel) -> f32;

    fn read_button(&mut self, button: OperatorButton) -> bool;
}

/// Output side of the stand hardware. Shared between the control task and
/// the interlock path, always behind the actuator bank's lock.
pub trait ActuatorInterface: Send {
    fn set_output(&mut self, actuator: ActuatorChannel, state: bool);

    /// Physical line state, read back independently of the commanded
    /// record so a driver-level disagreement is observable.
    fn read_output(&self, actuator: ActuatorChannel) -> bool;
}
