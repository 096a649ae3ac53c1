#![deny(unsafe_code)]

pub mod actuators;
pub mod fault;
pub mod firing_fsm;
pub mod interlock;
pub mod messages;
pub mod mode_fsm;
pub mod schedule;
pub mod sensing;
pub mod state_store;
pub mod tasks;
pub mod tsc;

pub use tsc::Tsc;

use shared::stand_hal::SensorSnapshot;

/// Feeding pressure gate for arming and sequence entry.
pub(crate) fn firing_pressure_met(snapshot: &SensorSnapshot, minimum_bar: f32) -> bool {
    snapshot.feeding_pressure_bar >= minimum_bar
}
