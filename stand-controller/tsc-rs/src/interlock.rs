use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::Mutex;
use shared::stand_hal::{FaultSeverity, SensorChannel};

/// A threshold rule that reached its consecutive-violation count.
#[derive(Debug, Clone, PartialEq)]
pub struct InterlockEvent {
    pub severity: FaultSeverity,
    pub channel: SensorChannel,
    pub limit: f32,
    pub value: f32,
}

/// Cross-task handoff between the fault monitor (acquisition side) and the
/// mode machine (control side). The acquisition cycle latches a forced
/// transition here after de-energizing the outputs; the control task
/// consumes it on its next tick.
pub struct Interlock {
    forced: Mutex<Option<InterlockEvent>>,
    conditions: AtomicU32,
    reset_pending: AtomicBool,
}

impl Interlock {
    pub fn new() -> Self {
        Self {
            forced: Mutex::new(None),
            conditions: AtomicU32::new(0),
            reset_pending: AtomicBool::new(false),
        }
    }

    pub fn latch(&self, event: InterlockEvent) {
        let mut forced = self.forced.lock();

        // A critical event must never be downgraded by a later warning
        // that fires before the control task has consumed the latch.
        match forced.as_ref() {
            Some(existing) if existing.severity == FaultSeverity::Critical => {}
            _ => *forced = Some(event),
        }
    }

    pub fn take(&self) -> Option<InterlockEvent> {
        self.forced.lock().take()
    }

    pub fn publish_conditions(&self, bitmask: u32) {
        self.conditions.store(bitmask, Ordering::Relaxed);
    }

    pub fn conditions(&self) -> u32 {
        self.conditions.load(Ordering::Relaxed)
    }

    /// Ask the fault monitor to clear its latched rules and counters on
    /// its next cycle. Only the explicit external reset path calls this.
    pub fn request_reset(&self) {
        self.reset_pending.store(true, Ordering::Relaxed);
    }

    pub fn take_reset_request(&self) -> bool {
        self.reset_pending.swap(false, Ordering::Relaxed)
    }
}

impl Default for Interlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning() -> InterlockEvent {
        InterlockEvent {
            severity: FaultSeverity::Warning,
            channel: SensorChannel::FeedingPressure,
            limit: 60.0,
            value: 61.0,
        }
    }

    fn critical() -> InterlockEvent {
        InterlockEvent {
            severity: FaultSeverity::Critical,
            channel: SensorChannel::ChamberPressure,
            limit: 60.0,
            value: 75.0,
        }
    }

    #[test]
    fn take_consumes_the_latch() {
        let interlock = Interlock::new();

        interlock.latch(warning());
        assert_eq!(interlock.take(), Some(warning()));
        assert_eq!(interlock.take(), None);
    }

    #[test]
    fn warning_cannot_downgrade_pending_critical() {
        let interlock = Interlock::new();

        interlock.latch(critical());
        interlock.latch(warning());

        assert_eq!(interlock.take(), Some(critical()));
    }

    #[test]
    fn critical_replaces_pending_warning() {
        let interlock = Interlock::new();

        interlock.latch(warning());
        interlock.latch(critical());

        assert_eq!(interlock.take(), Some(critical()));
    }

    #[test]
    fn reset_request_is_one_shot() {
        let interlock = Interlock::new();

        interlock.request_reset();
        assert!(interlock.take_reset_request());
        assert!(!interlock.take_reset_request());
    }
}
