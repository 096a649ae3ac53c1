use shared::ControllerState;

use super::FiringFsm;
use crate::Tsc;

/// Terminal substate of a completed run; the mode machine returns the
/// stand to idle when it observes this.
pub struct Finished;

impl ControllerState<FiringFsm, Tsc> for Finished {
    fn update(&mut self, _tsc: &mut Tsc, _dt: f32) -> Option<FiringFsm> {
        None
    }

    fn enter_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl Finished {
    pub fn new() -> FiringFsm {
        FiringFsm::Finished(Self)
    }
}
