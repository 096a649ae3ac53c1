use shared::stand_hal::{ActuatorChannel, ButtonStates};
use shared::ControllerState;

use super::{heating::Heating, sequence::Sequence, ModeFsm};
use crate::{firing_pressure_met, Tsc};

/// Idle/armed state. Manual venting and feeding paths live here, and the
/// ignition button is debounced against accidental touches: it must be
/// held continuously for the configured safe-press time, with minimum
/// firing pressure met for the whole hold, before a sequence starts.
pub struct Wait {
    ignition_held_s: f32,
    pressure_reject_sent: bool,
    prev_buttons: ButtonStates,
}

impl ControllerState<ModeFsm, Tsc> for Wait {
    fn update(&mut self, tsc: &mut Tsc, dt: f32) -> Option<ModeFsm> {
        let buttons = tsc.snapshot.buttons;

        // Manual paths, mutually exclusive with SEQUENCE by construction
        // of the mode machine.
        if buttons.vent != self.prev_buttons.vent {
            tsc.set_actuator(ActuatorChannel::DumpValve, buttons.vent);
        }
        if buttons.feeding_valve != self.prev_buttons.feeding_valve {
            tsc.set_actuator(ActuatorChannel::FeedingValve, buttons.feeding_valve);
        }

        if buttons.heating {
            self.prev_buttons = buttons;
            return Some(Heating::new());
        }

        let next = self.update_ignition_arming(tsc, dt, &buttons);
        self.prev_buttons = buttons;

        next
    }

    fn enter_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }

    fn exit_state(&mut self, _tsc: &mut Tsc) {
        // Nothing
    }
}

impl Wait {
    pub fn new() -> ModeFsm {
        ModeFsm::Wait(Self {
            ignition_held_s: 0.0,
            pressure_reject_sent: false,
            prev_buttons: ButtonStates::default(),
        })
    }

    fn update_ignition_arming(
        &mut self,
        tsc: &mut Tsc,
        dt: f32,
        buttons: &ButtonStates,
    ) -> Option<ModeFsm> {
        if !buttons.ignition {
            if self.prev_buttons.ignition
                && self.ignition_held_s > 0.0
                && self.ignition_held_s < tsc.config.safe_press_s
            {
                tsc.messages.append("ignition released before safe-press time");
            }

            self.ignition_held_s = 0.0;
            self.pressure_reject_sent = false;
            return None;
        }

        if !firing_pressure_met(&tsc.snapshot, tsc.config.minimum_firing_pressure_bar) {
            // The hold starts over; a pressure dip mid-press disarms.
            self.ignition_held_s = 0.0;

            if !self.pressure_reject_sent {
                tsc.messages
                    .append("ignition pressed below minimum firing pressure");
                self.pressure_reject_sent = true;
            }
            return None;
        }

        self.ignition_held_s += dt;
        if self.ignition_held_s >= tsc.config.safe_press_s {
            return Some(Sequence::new());
        }

        None
    }
}
