use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

use crate::stand_hal::SensorChannel;

/// Linear engineering-unit conversion, `y = slope * x + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub slope: f32,
    pub offset: f32,
}

impl LinearModel {
    pub const fn new(slope: f32, offset: f32) -> Self {
        Self { slope, offset }
    }

    pub const fn identity() -> Self {
        Self {
            slope: 1.0,
            offset: 0.0,
        }
    }

    /// Model from calibration sheet span points: `zero` raw input reads 0,
    /// `zero + span` raw input reads `full_scale` engineering units.
    pub fn from_span(points: SpanPoints) -> Self {
        let slope = points.full_scale / points.span;
        let offset = points.full_scale - slope * (points.span + points.zero);

        Self { slope, offset }
    }

    pub fn apply(&self, raw: f32) -> f32 {
        self.slope * raw + self.offset
    }
}

/// Span-point description of a transducer: zero-point raw value, raw span,
/// and the engineering value at the top of the span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanPoints {
    pub zero: f32,
    pub span: f32,
    pub full_scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Nominal ADC reference voltage the raw domain is scaled against.
    pub adc_reference_v: f32,
    /// Bench-measured reference voltage; the ratio corrects every sample.
    pub adc_measured_v: f32,
    /// Sense resistance converting 4-20 mA loop current to voltage.
    pub sense_resistance_ohm: f32,
    /// Samples averaged per load-cell reading to suppress noise.
    pub load_cell_samples: u32,
    /// Voltage-output pressure transducer span (volts in, bar out).
    pub voltage_pressure: SpanPoints,
    /// Current-output pressure transducer span (milliamps in, bar out).
    pub current_pressure: SpanPoints,
    /// Load cell span (volts in, newtons out).
    pub load_cell: SpanPoints,
    /// Resistive temperature sensor line (volts in, celsius out).
    pub temperature: LinearModel,
    /// Infra-red plume sensor line (volts in, celsius out).
    pub infra_red: LinearModel,
}

impl CalibrationConfig {
    pub fn default() -> Self {
        Self {
            adc_reference_v: 5.00,
            adc_measured_v: 4.98,
            sense_resistance_ohm: 250.0,
            load_cell_samples: 4,
            voltage_pressure: SpanPoints {
                zero: -0.003,
                span: 5.003,
                full_scale: 100.0,
            },
            current_pressure: SpanPoints {
                zero: 4.0,
                span: 16.0,
                full_scale: 172.3689,
            },
            load_cell: SpanPoints {
                zero: 0.432,
                span: 4.0,
                full_scale: 250.0 * 4.44822,
            },
            // TMP36 line: 10 mV/C with a 500 mV offset at 0 C.
            temperature: LinearModel::new(100.0, -50.0),
            // -50..1030 C over the 0..5 V output range.
            infra_red: LinearModel::new(216.0, -50.0),
        }
    }
}

/// Per-channel models, derived once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct CalibrationSet {
    models: [LinearModel; SensorChannel::COUNT],
    adc_correction: f32,
    sense_resistance_ohm: f32,
    load_cell_samples: u32,
}

impl CalibrationSet {
    pub fn new(config: &CalibrationConfig) -> Self {
        let mut models = [LinearModel::identity(); SensorChannel::COUNT];

        for channel in SensorChannel::iter() {
            models[channel.index()] = match channel {
                SensorChannel::FeedingPressure => LinearModel::from_span(config.voltage_pressure),
                SensorChannel::LinePressure | SensorChannel::ChamberPressure => {
                    LinearModel::from_span(config.current_pressure)
                }
                SensorChannel::Thrust => LinearModel::from_span(config.load_cell),
                SensorChannel::BottleTemperature
                | SensorChannel::InjectorTemperature
                | SensorChannel::NozzleTemperature
                | SensorChannel::AmbientTemperature => config.temperature,
                SensorChannel::PlumeTemperature => config.infra_red,
                SensorChannel::IgnitionGround => LinearModel::identity(),
            };
        }

        Self {
            models,
            adc_correction: config.adc_measured_v / config.adc_reference_v,
            sense_resistance_ohm: config.sense_resistance_ohm,
            load_cell_samples: config.load_cell_samples,
        }
    }

    pub fn load_cell_samples(&self) -> u32 {
        self.load_cell_samples.max(1)
    }

    /// Convert one raw sample (nominal-reference volts) to engineering
    /// units. No error path: out-of-range inputs produce out-of-range
    /// outputs for the fault monitor to judge.
    pub fn calibrate(&self, channel: SensorChannel, raw_v: f32) -> f32 {
        let corrected = raw_v * self.adc_correction;

        let raw = if Self::is_current_loop(channel) {
            // 4-20 mA loop sensors are read across the sense resistor;
            // the span model lives in the milliamp domain.
            corrected / self.sense_resistance_ohm * 1000.0
        } else {
            corrected
        };

        self.models[channel.index()].apply(raw)
    }

    fn is_current_loop(channel: SensorChannel) -> bool {
        matches!(
            channel,
            SensorChannel::LinePressure | SensorChannel::ChamberPressure
        )
    }
}
