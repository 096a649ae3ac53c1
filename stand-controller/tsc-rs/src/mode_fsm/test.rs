use shared::ControllerState;
use tracing::warn;

use super::{wait::Wait, ModeFsm};
use crate::Tsc;

/// How long the stand lingers in the verification state before returning
/// to idle, so the operator can see the result.
const VERIFICATION_HOLD_S: f32 = 10.0;

/// Actuator read-back self-check: with every output de-energized, the
/// commanded record and the physical lines must agree. Disagreements are
/// reported, never auto-corrected.
pub struct Test {
    checked: bool,
    hold_elapsed_s: f32,
}

impl ControllerState<ModeFsm, Tsc> for Test {
    fn update(&mut self, tsc: &mut Tsc, dt: f32) -> Option<ModeFsm> {
        if !self.checked {
            self.run_check(tsc);
        }

        self.hold_elapsed_s += dt;
        if self.hold_elapsed_s >= VERIFICATION_HOLD_S {
            return Some(Wait::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        // The check runs against known-safe outputs, including any valve
        // an operator left open manually.
        tsc.actuators.safe_all();
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl Test {
    pub fn new() -> ModeFsm {
        ModeFsm::Test(Self {
            checked: false,
            hold_elapsed_s: 0.0,
        })
    }

    fn run_check(&mut self, tsc: &mut Tsc) {
        let mismatches = match tsc.actuators.verify_outputs() {
            Ok(mismatches) => mismatches,
            // Contended bank lock; retry on the next tick.
            Err(_) => return,
        };

        self.checked = true;

        if mismatches.is_empty() {
            tsc.messages.append("actuator self-check passed");
            return;
        }

        for (actuator, commanded, actual) in mismatches {
            warn!(?actuator, commanded, actual, "actuator read-back mismatch");
            tsc.messages.append(&format!(
                "read-back mismatch: {actuator:?} commanded {commanded} actual {actual}"
            ));
        }
    }
}
