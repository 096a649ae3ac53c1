use shared::ControllerState;

use super::ModeFsm;
use crate::Tsc;

/// Emergency stop, terminal for the run. Only the explicit external reset
/// re-enters `Init`; there is no automatic recovery.
pub struct Shutdown;

impl ControllerState<ModeFsm, Tsc> for Shutdown {
    fn update(&mut self, _tsc: &mut Tsc, _dt: f32) -> Option<ModeFsm> {
        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        // De-energize first, report second.
        tsc.actuators.safe_all();
        tsc.messages.append("emergency shutdown");
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl Shutdown {
    pub fn new() -> ModeFsm {
        ModeFsm::Shutdown(Self)
    }
}
