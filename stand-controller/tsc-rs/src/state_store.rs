use std::time::Duration;

use parking_lot::Mutex;
use shared::stand_hal::{ControlStatus, SensorSnapshot};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("state store lock not acquired within {0} ms")]
    LockTimeout(u64),
}

/// Latest-value store shared by the acquisition task, the control task and
/// the telemetry reporter. Whole records swap under the lock, so a reader
/// never sees fields from two different cycles.
///
/// Lock waits are bounded: a caller that cannot take the lock within the
/// timeout skips its operation for that cycle instead of stalling a
/// periodic loop behind a slow reader.
pub struct StateStore {
    snapshot: Mutex<Option<SensorSnapshot>>,
    status: Mutex<ControlStatus>,
    lock_timeout: Duration,
}

impl StateStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            snapshot: Mutex::new(None),
            status: Mutex::new(ControlStatus::startup()),
            lock_timeout,
        }
    }

    pub fn publish_snapshot(&self, snapshot: SensorSnapshot) -> Result<(), StoreError> {
        let mut guard = self
            .snapshot
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;
        *guard = Some(snapshot);

        Ok(())
    }

    pub fn latest_snapshot(&self) -> Result<Option<SensorSnapshot>, StoreError> {
        let guard = self
            .snapshot
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;

        Ok(*guard)
    }

    pub fn publish_status(&self, status: ControlStatus) -> Result<(), StoreError> {
        let mut guard = self
            .status
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;
        *guard = status;

        Ok(())
    }

    pub fn latest_status(&self) -> Result<ControlStatus, StoreError> {
        let guard = self
            .status
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| self.timeout_error())?;

        Ok(*guard)
    }

    fn timeout_error(&self) -> StoreError {
        StoreError::LockTimeout(self.lock_timeout.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::stand_hal::Mode;

    fn store() -> StateStore {
        StateStore::new(Duration::from_millis(5))
    }

    #[test]
    fn snapshot_replaces_whole_record() {
        let store = store();

        let mut first = SensorSnapshot::zeroed();
        first.timestamp_ms = 100;
        first.chamber_pressure_bar = 12.0;
        store.publish_snapshot(first).unwrap();

        let mut second = SensorSnapshot::zeroed();
        second.timestamp_ms = 110;
        second.chamber_pressure_bar = 14.5;
        store.publish_snapshot(second).unwrap();

        let latest = store.latest_snapshot().unwrap().unwrap();
        assert_eq!(latest, second);
    }

    #[test]
    fn no_snapshot_before_first_publish() {
        assert_eq!(store().latest_snapshot().unwrap(), None);
    }

    #[test]
    fn status_round_trip() {
        let store = store();

        let mut status = ControlStatus::startup();
        status.mode = Mode::Wait;
        status.dump_valve_open = true;
        store.publish_status(status).unwrap();

        assert_eq!(store.latest_status().unwrap(), status);
    }

    #[test]
    fn contended_write_times_out_instead_of_blocking() {
        let store = store();

        let held = store.snapshot.lock();
        let result = store.publish_snapshot(SensorSnapshot::zeroed());
        drop(held);

        assert_eq!(result, Err(StoreError::LockTimeout(5)));
        // The skipped cycle must not have corrupted the stored value.
        assert_eq!(store.latest_snapshot().unwrap(), None);
    }
}
