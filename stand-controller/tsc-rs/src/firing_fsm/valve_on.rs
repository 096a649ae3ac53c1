use shared::stand_hal::ActuatorChannel;
use shared::ControllerState;

use super::{ignit_off::IgnitOff, FiringFsm};
use crate::Tsc;

/// Propellant valves open partway through the igniter burn; the igniter
/// stays on underneath.
pub struct ValveOn;

impl ControllerState<FiringFsm, Tsc> for ValveOn {
    fn update(&mut self, tsc: &mut Tsc, _dt: f32) -> Option<FiringFsm> {
        if tsc.sequence_elapsed_s >= tsc.schedule.ignition_off_s {
            return Some(IgnitOff::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.set_actuator(ActuatorChannel::MainValve, true);
        tsc.set_actuator(ActuatorChannel::FeedingValve, true);
        tsc.messages.append("valves open");
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl ValveOn {
    pub fn new() -> FiringFsm {
        FiringFsm::ValveOn(Self)
    }
}
