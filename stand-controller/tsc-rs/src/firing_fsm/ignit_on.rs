use shared::stand_hal::ActuatorChannel;
use shared::ControllerState;

use super::{valve_on::ValveOn, FiringFsm};
use crate::Tsc;

pub struct IgnitOn;

impl ControllerState<FiringFsm, Tsc> for IgnitOn {
    fn update(&mut self, tsc: &mut Tsc, _dt: f32) -> Option<FiringFsm> {
        if tsc.sequence_elapsed_s >= tsc.schedule.valve_on_s {
            return Some(ValveOn::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.set_actuator(ActuatorChannel::Igniter, true);
        tsc.messages.append("igniter on");
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl IgnitOn {
    pub fn new() -> FiringFsm {
        FiringFsm::IgnitOn(Self)
    }
}
