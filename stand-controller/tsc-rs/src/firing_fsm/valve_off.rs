use shared::stand_hal::ActuatorChannel;
use shared::ControllerState;

use super::{finished::Finished, FiringFsm};
use crate::Tsc;

/// Burn over; valves closed while the engine cools down.
pub struct ValveOff;

impl ControllerState<FiringFsm, Tsc> for ValveOff {
    fn update(&mut self, tsc: &mut Tsc, _dt: f32) -> Option<FiringFsm> {
        if tsc.sequence_elapsed_s >= tsc.schedule.finished_s {
            return Some(Finished::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.set_actuator(ActuatorChannel::MainValve, false);
        tsc.set_actuator(ActuatorChannel::FeedingValve, false);
        tsc.messages.append("valves closed");
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl ValveOff {
    pub fn new() -> FiringFsm {
        FiringFsm::ValveOff(Self)
    }
}
