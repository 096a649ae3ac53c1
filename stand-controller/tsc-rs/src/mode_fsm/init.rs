use shared::ControllerState;

use super::{test::Test, ModeFsm};
use crate::Tsc;

/// Boot state: everything de-energized while the transducers settle.
pub struct Init {
    settle_elapsed_s: f32,
}

impl ControllerState<ModeFsm, Tsc> for Init {
    fn update(&mut self, tsc: &mut Tsc, dt: f32) -> Option<ModeFsm> {
        self.settle_elapsed_s += dt;

        if self.settle_elapsed_s >= tsc.config.sensor_settle_s {
            return Some(Test::new());
        }

        None
    }

    fn enter_state(&mut self, tsc: &mut Tsc) {
        tsc.actuators.safe_all();
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl Init {
    pub fn new() -> ModeFsm {
        ModeFsm::Init(Self {
            settle_elapsed_s: 0.0,
        })
    }
}
