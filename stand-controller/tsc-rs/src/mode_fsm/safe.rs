use shared::ControllerState;

use super::ModeFsm;
use crate::Tsc;

/// Interlock/abort refuge. Everything is de-energized on entry and stays
/// that way; only the explicit external reset command leaves this state.
pub struct Safe;

impl ControllerState<ModeFsm, Tsc> for Safe {
    fn update(&mut self, _tsc: &mut Tsc, _dt: f32) -> Option<ModeFsm> {
        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        // De-energize first, report second.
        tsc.actuators.safe_all();
        tsc.messages.append("safe state entered");
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl Safe {
    pub fn new() -> ModeFsm {
        ModeFsm::Safe(Self)
    }
}
