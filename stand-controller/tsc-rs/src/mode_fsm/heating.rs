use shared::stand_hal::ActuatorChannel;
use shared::ControllerState;

use super::{wait::Wait, ModeFsm};
use crate::Tsc;

/// Heating blankets on while the operator holds the heating button, with
/// an automatic cutoff at the tank temperature limit.
pub struct Heating;

impl ControllerState<ModeFsm, Tsc> for Heating {
    fn update(&mut self, tsc: &mut Tsc, _dt: f32) -> Option<ModeFsm> {
        if tsc.snapshot.bottle_temperature_c >= tsc.config.tank_temperature_limit_c {
            tsc.messages.append("tank temperature limit reached");
            return Some(Wait::new());
        }

        if !tsc.snapshot.buttons.heating {
            return Some(Wait::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.set_actuator(ActuatorChannel::Heater, true);
        tsc.messages.append("heating on");
    }

    fn exit_state(&mut self, tsc: &mut Tsc) {
        tsc.set_actuator(ActuatorChannel::Heater, false);
    }
}

impl Heating {
    pub fn new() -> ModeFsm {
        ModeFsm::Heating(Self)
    }
}
