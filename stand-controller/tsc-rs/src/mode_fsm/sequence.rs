use shared::stand_hal::FiringState;
use shared::ControllerState;

use super::{wait::Wait, ModeFsm};
use crate::Tsc;

/// The firing run. Owns nothing itself; it drives the firing substate
/// machine against the elapsed time since sequence start and hands the
/// stand back to `Wait` once the cooldown completes. An interlock or
/// abort leaves this state through the forced-transition path instead,
/// abandoning the remaining substates.
pub struct Sequence;

impl ControllerState<ModeFsm, Tsc> for Sequence {
    fn update(&mut self, tsc: &mut Tsc, dt: f32) -> Option<ModeFsm> {
        tsc.sequence_elapsed_s += dt;

        if let Some(mut firing) = tsc.firing.take() {
            firing.update(tsc, dt);
            tsc.firing = Some(firing);
        }

        if tsc.firing_state() == FiringState::Finished {
            tsc.messages.append("firing sequence finished");
            return Some(Wait::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.messages.append("firing sequence started");
        tsc.begin_sequence();
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // The firing entity is left in place so telemetry still shows
        // which substate an abandoned run reached.
    }
}

impl Sequence {
    pub fn new() -> ModeFsm {
        ModeFsm::Sequence(Self)
    }
}
