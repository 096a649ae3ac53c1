use shared::stand_hal::Mode;
use shared::{ControllerFsm, ControllerState};

use crate::Tsc;

pub mod heating;
pub mod init;
pub mod safe;
pub mod sequence;
pub mod shutdown;
pub mod test;
pub mod wait;

pub enum ModeFsm {
    Init(init::Init),
    Test(test::Test),
    Wait(wait::Wait),
    Heating(heating::Heating),
    Sequence(sequence::Sequence),
    Safe(safe::Safe),
    Shutdown(shutdown::Shutdown),
}

impl ControllerFsm<ModeFsm, Tsc, Mode> for ModeFsm {
    fn to_controller_state(&mut self) -> &mut dyn ControllerState<ModeFsm, Tsc> {
        match self {
            ModeFsm::Init(state) => state,
            ModeFsm::Test(state) => state,
            ModeFsm::Wait(state) => state,
            ModeFsm::Heating(state) => state,
            ModeFsm::Sequence(state) => state,
            ModeFsm::Safe(state) => state,
            ModeFsm::Shutdown(state) => state,
        }
    }

    fn hal_state(&self) -> Mode {
        match self {
            ModeFsm::Init(_) => Mode::Init,
            ModeFsm::Test(_) => Mode::Test,
            ModeFsm::Wait(_) => Mode::Wait,
            ModeFsm::Heating(_) => Mode::Heating,
            ModeFsm::Sequence(_) => Mode::Sequence,
            ModeFsm::Safe(_) => Mode::Safe,
            ModeFsm::Shutdown(_) => Mode::Shutdown,
        }
    }
}

/// Closed transition table for the mode machine. Anything not listed here
/// is rejected at the boundary, including every path out of `Shutdown`
/// other than the explicit reset to `Init`.
pub fn transition_allowed(from: Mode, to: Mode) -> bool {
    match (from, to) {
        (Mode::Shutdown, Mode::Init) => true,
        (Mode::Shutdown, _) => false,
        (_, Mode::Safe) | (_, Mode::Shutdown) => true,
        (Mode::Init, Mode::Test) => true,
        (Mode::Test, Mode::Wait) => true,
        (Mode::Wait, Mode::Test) | (Mode::Wait, Mode::Heating) | (Mode::Wait, Mode::Sequence) => {
            true
        }
        (Mode::Heating, Mode::Wait) => true,
        (Mode::Sequence, Mode::Wait) => true,
        (Mode::Safe, Mode::Wait) => true,
        _ => false,
    }
}

/// Fresh FSM value for a forced transition to `target`.
pub fn fsm_for(target: Mode) -> ModeFsm {
    match target {
        Mode::Init => init::Init::new(),
        Mode::Test => test::Test::new(),
        Mode::Wait => wait::Wait::new(),
        Mode::Heating => heating::Heating::new(),
        Mode::Sequence => sequence::Sequence::new(),
        Mode::Safe => safe::Safe::new(),
        Mode::Shutdown => shutdown::Shutdown::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn shutdown_is_terminal_except_for_reset() {
        for target in Mode::iter() {
            let allowed = transition_allowed(Mode::Shutdown, target);
            assert_eq!(allowed, target == Mode::Init, "Shutdown -> {target:?}");
        }
    }

    #[test]
    fn safety_modes_reachable_from_everywhere_else() {
        for from in Mode::iter().filter(|mode| *mode != Mode::Shutdown) {
            assert!(transition_allowed(from, Mode::Shutdown), "{from:?}");
            if from != Mode::Safe {
                assert!(transition_allowed(from, Mode::Safe), "{from:?}");
            }
        }
    }

    #[test]
    fn no_automatic_path_from_safety_back_to_sequence() {
        assert!(!transition_allowed(Mode::Safe, Mode::Sequence));
        assert!(!transition_allowed(Mode::Shutdown, Mode::Sequence));
    }

    #[test]
    fn nominal_progression() {
        assert!(transition_allowed(Mode::Init, Mode::Test));
        assert!(transition_allowed(Mode::Test, Mode::Wait));
        assert!(transition_allowed(Mode::Wait, Mode::Sequence));
        assert!(transition_allowed(Mode::Sequence, Mode::Wait));
        assert!(!transition_allowed(Mode::Init, Mode::Sequence));
        assert!(!transition_allowed(Mode::Heating, Mode::Sequence));
    }
}
