use shared::ControllerState;

use super::{ignit_on::IgnitOn, FiringFsm};
use crate::Tsc;

/// Zero point of the timeline; hands over to the igniter at offset zero,
/// which is the first poll after sequence start.
pub struct AllOff;

impl ControllerState<FiringFsm, Tsc> for AllOff {
    fn update(&mut self, tsc: &mut Tsc, _dt: f32) -> Option<FiringFsm> {
        if tsc.sequence_elapsed_s >= tsc.schedule.ignition_on_s {
            return Some(IgnitOn::new());
        }

        None
    }

    fn enter_state(&mut self, _tsc: &mut Tsc) {
        // Nothing energized yet.
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl AllOff {
    pub fn new() -> FiringFsm {
        FiringFsm::AllOff(Self)
    }
}
