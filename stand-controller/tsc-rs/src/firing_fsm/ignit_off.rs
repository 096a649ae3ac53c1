use shared::stand_hal::ActuatorChannel;
use shared::ControllerState;

use super::{valve_off::ValveOff, FiringFsm};
use crate::Tsc;

pub struct IgnitOff;

impl ControllerState<FiringFsm, Tsc> for IgnitOff {
    fn update(&mut self, tsc: &mut Tsc, _dt: f32) -> Option<FiringFsm> {
        if tsc.sequence_elapsed_s >= tsc.schedule.valve_off_s {
            return Some(ValveOff::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.set_actuator(ActuatorChannel::Igniter, false);
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl IgnitOff {
    pub fn new() -> FiringFsm {
        FiringFsm::IgnitOff(Self)
    }
}
