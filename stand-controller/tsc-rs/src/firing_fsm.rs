use shared::stand_hal::FiringState;
use shared::{ControllerFsm, ControllerState};

use crate::Tsc;

pub mod all_off;
pub mod finished;
pub mod ignit_off;
pub mod ignit_on;
pub mod valve_off;
pub mod valve_on;

/// Firing substate machine. Substates advance in one fixed order, each
/// transition gated on an absolute schedule offset having elapsed since
/// sequence start; a substate is never skipped or revisited within a run.
pub enum FiringFsm {
    AllOff(all_off::AllOff),
    IgnitOn(ignit_on::IgnitOn),
    ValveOn(valve_on::ValveOn),
    IgnitOff(ignit_off::IgnitOff),
    ValveOff(valve_off::ValveOff),
    Finished(finished::Finished),
}

impl ControllerFsm<FiringFsm, Tsc, FiringState> for FiringFsm {
    fn to_controller_state(&mut self) -> &mut dyn ControllerState<FiringFsm, Tsc> {
        match self {
            FiringFsm::AllOff(state) => state,
            FiringFsm::IgnitOn(state) => state,
            FiringFsm::ValveOn(state) => state,
            FiringFsm::IgnitOff(state) => state,
            FiringFsm::ValveOff(state) => state,
            FiringFsm::Finished(state) => state,
        }
    }

    fn hal_state(&self) -> FiringState {
        match self {
            FiringFsm::AllOff(_) => FiringState::AllOff,
            FiringFsm::IgnitOn(_) => FiringState::IgnitOn,
            FiringFsm::ValveOn(_) => FiringState::ValveOn,
            FiringFsm::IgnitOff(_) => FiringState::IgnitOff,
            FiringFsm::ValveOff(_) => FiringState::ValveOff,
            FiringFsm::Finished(_) => FiringState::Finished,
        }
    }
}
