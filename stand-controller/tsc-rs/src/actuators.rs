use std::time::Duration;

use parking_lot::Mutex;
use shared::stand_hal::{ActuatorChannel, ActuatorInterface};
use strum::{EnumCount, IntoEnumIterator};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActuatorError {
    #[error("actuator lock not acquired within {0} ms")]
    LockTimeout(u64),
}

struct Bank {
    io: Box<dyn ActuatorInterface>,
    commanded: [bool; ActuatorChannel::COUNT],
}

/// Single exclusive lock over every digital output on the stand. All
/// outputs de-energize to their safe state, so a skipped write leaves the
/// hardware stale but safe.
pub struct ActuatorBank {
    bank: Mutex<Bank>,
    lock_timeout: Duration,
}

impl ActuatorBank {
    pub fn new(io: Box<dyn ActuatorInterface>, lock_timeout: Duration) -> Self {
        Self {
            bank: Mutex::new(Bank {
                io,
                commanded: [false; ActuatorChannel::COUNT],
            }),
            lock_timeout,
        }
    }

    /// Command one output. Bounded wait; on contention the write is
    /// skipped for this call and the output retains its prior state.
    pub fn set(&self, actuator: ActuatorChannel, state: bool) -> Result<(), ActuatorError> {
        let mut bank = self.bank.try_lock_for(self.lock_timeout).ok_or_else(|| {
            warn!(?actuator, "actuator bank lock contended, write skipped");
            self.timeout_error()
        })?;

        bank.io.set_output(actuator, state);
        bank.commanded[actuator.index()] = state;

        Ok(())
    }

    /// De-energize everything. This is the interlock/abort path and must
    /// never be skippable, so it takes the lock unconditionally; critical
    /// sections in this bank are a handful of pin writes.
    pub fn safe_all(&self) {
        let mut bank = self.bank.lock();

        for actuator in ActuatorChannel::iter() {
            bank.io.set_output(actuator, false);
            bank.commanded[actuator.index()] = false;
        }
    }

    pub fn commanded(&self, actuator: ActuatorChannel) -> Result<bool, ActuatorError> {
        let bank = self
            .bank
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;

        Ok(bank.commanded[actuator.index()])
    }

    /// Commanded record for every output in one lock acquisition.
    pub fn commanded_all(&self) -> Result<[bool; ActuatorChannel::COUNT], ActuatorError> {
        let bank = self
            .bank
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;

        Ok(bank.commanded)
    }

    /// Physical line state straight from the driver, independent of the
    /// commanded record, so a disagreeing output is observable.
    pub fn read_back(&self, actuator: ActuatorChannel) -> Result<bool, ActuatorError> {
        let bank = self
            .bank
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;

        Ok(bank.io.read_output(actuator))
    }

    /// Commanded vs read-back comparison for every output.
    pub fn verify_outputs(&self) -> Result<Vec<(ActuatorChannel, bool, bool)>, ActuatorError> {
        let bank = self
            .bank
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;

        let mut mismatches = Vec::new();
        for actuator in ActuatorChannel::iter() {
            let commanded = bank.commanded[actuator.index()];
            let actual = bank.io.read_output(actuator);
            if commanded != actual {
                mismatches.push((actuator, commanded, actual));
            }
        }

        Ok(mismatches)
    }

    fn timeout_error(&self) -> ActuatorError {
        ActuatorError::LockTimeout(self.lock_timeout.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::stand_mock::MockStand;

    fn bank(stand: &MockStand) -> ActuatorBank {
        let (_, actuators) = stand.split();
        ActuatorBank::new(Box::new(actuators), Duration::from_millis(5))
    }

    #[test]
    fn set_drives_line_and_commanded_record() {
        let stand = MockStand::new();
        let bank = bank(&stand);

        bank.set(ActuatorChannel::Igniter, true).unwrap();

        assert!(stand.output(ActuatorChannel::Igniter));
        assert!(bank.commanded(ActuatorChannel::Igniter).unwrap());
        assert!(bank.read_back(ActuatorChannel::Igniter).unwrap());
    }

    #[test]
    fn safe_all_deenergizes_every_output() {
        let stand = MockStand::new();
        let bank = bank(&stand);

        bank.set(ActuatorChannel::Igniter, true).unwrap();
        bank.set(ActuatorChannel::MainValve, true).unwrap();
        bank.set(ActuatorChannel::Heater, true).unwrap();

        bank.safe_all();

        for actuator in ActuatorChannel::iter() {
            assert!(!stand.output(actuator));
            assert!(!bank.commanded(actuator).unwrap());
        }
    }

    #[test]
    fn read_back_sees_jammed_line() {
        let stand = MockStand::new();
        let bank = bank(&stand);

        stand.jam_output(ActuatorChannel::MainValve, true);

        assert!(!bank.commanded(ActuatorChannel::MainValve).unwrap());
        assert!(bank.read_back(ActuatorChannel::MainValve).unwrap());

        let mismatches = bank.verify_outputs().unwrap();
        assert_eq!(mismatches, vec![(ActuatorChannel::MainValve, false, true)]);
    }
}
