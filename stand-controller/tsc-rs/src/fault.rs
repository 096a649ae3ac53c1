use shared::stand_hal::{FaultSeverity, SensorSnapshot, ThresholdRule};
use tracing::{error, warn};

use crate::interlock::InterlockEvent;

struct RuleState {
    rule: ThresholdRule,
    violations: u32,
    fired: bool,
}

/// Threshold supervision with successive-pass hysteresis. Single-sample
/// ADC noise must not abort a multi-second hardware test, so a rule fires
/// only after its configured number of consecutive violating samples; the
/// detection latency is bounded by that count times the sampling period.
pub struct FaultMonitor {
    rules: Vec<RuleState>,
}

impl FaultMonitor {
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| RuleState {
                    rule,
                    violations: 0,
                    fired: false,
                })
                .collect(),
        }
    }

    /// Evaluate every rule against one snapshot. Returns the most severe
    /// newly fired rule, if any. Fired rules stay latched until `reset`.
    pub fn evaluate(&mut self, snapshot: &SensorSnapshot) -> Option<InterlockEvent> {
        let mut fired: Option<InterlockEvent> = None;

        for state in self.rules.iter_mut() {
            let value = snapshot.channel_value(state.rule.channel);

            if value > state.rule.limit {
                state.violations += 1;
            } else {
                state.violations = 0;
                continue;
            }

            if state.fired || state.violations < state.rule.consecutive_samples {
                continue;
            }

            state.fired = true;
            let event = InterlockEvent {
                severity: state.rule.severity,
                channel: state.rule.channel,
                limit: state.rule.limit,
                value,
            };

            match state.rule.severity {
                FaultSeverity::Critical => error!(
                    channel = ?event.channel,
                    value,
                    limit = event.limit,
                    "critical threshold violated",
                ),
                FaultSeverity::Warning => warn!(
                    channel = ?event.channel,
                    value,
                    limit = event.limit,
                    "warning threshold violated",
                ),
            }

            let more_severe = match (&fired, state.rule.severity) {
                (None, _) => true,
                (Some(existing), FaultSeverity::Critical) => {
                    existing.severity != FaultSeverity::Critical
                }
                _ => false,
            };
            if more_severe {
                fired = Some(event);
            }
        }

        fired
    }

    /// Latched-rule bitmask, one bit per configured rule, for telemetry.
    pub fn conditions(&self) -> u32 {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, state)| state.fired)
            .fold(0, |mask, (index, _)| mask | 1 << (index as u32 & 31))
    }

    /// Explicit external reset: clears latched rules and counters. Never
    /// called from inside the control core itself.
    pub fn reset(&mut self) {
        for state in self.rules.iter_mut() {
            state.violations = 0;
            state.fired = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::stand_hal::SensorChannel;

    fn chamber_rule(consecutive: u32) -> ThresholdRule {
        ThresholdRule {
            channel: SensorChannel::ChamberPressure,
            limit: 60.0,
            severity: FaultSeverity::Critical,
            consecutive_samples: consecutive,
        }
    }

    fn snapshot_with(channel: SensorChannel, value: f32) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::zeroed();
        snapshot.set_channel_value(channel, value);
        snapshot
    }

    #[test]
    fn fires_after_exact_consecutive_count() {
        let mut monitor = FaultMonitor::new(vec![chamber_rule(5)]);
        let violating = snapshot_with(SensorChannel::ChamberPressure, 72.0);

        for _ in 0..4 {
            assert_eq!(monitor.evaluate(&violating), None);
        }

        let event = monitor.evaluate(&violating).expect("rule must fire");
        assert_eq!(event.channel, SensorChannel::ChamberPressure);
        assert_eq!(event.severity, FaultSeverity::Critical);
    }

    #[test]
    fn in_range_sample_resets_the_counter() {
        let mut monitor = FaultMonitor::new(vec![chamber_rule(5)]);
        let violating = snapshot_with(SensorChannel::ChamberPressure, 72.0);
        let nominal = snapshot_with(SensorChannel::ChamberPressure, 30.0);

        for _ in 0..4 {
            assert_eq!(monitor.evaluate(&violating), None);
        }
        assert_eq!(monitor.evaluate(&nominal), None);

        // The streak starts over; four more violations stay silent.
        for _ in 0..4 {
            assert_eq!(monitor.evaluate(&violating), None);
        }
    }

    #[test]
    fn fired_rule_stays_latched_until_reset() {
        let mut monitor = FaultMonitor::new(vec![chamber_rule(1)]);
        let violating = snapshot_with(SensorChannel::ChamberPressure, 72.0);

        assert!(monitor.evaluate(&violating).is_some());
        assert_eq!(monitor.conditions(), 0b1);

        // Still violating, but the event is reported only once.
        assert_eq!(monitor.evaluate(&violating), None);
        assert_eq!(monitor.conditions(), 0b1);

        monitor.reset();
        assert_eq!(monitor.conditions(), 0);
        assert!(monitor.evaluate(&violating).is_some());
    }

    #[test]
    fn critical_wins_over_warning_in_same_cycle() {
        let warning = ThresholdRule {
            channel: SensorChannel::FeedingPressure,
            limit: 60.0,
            severity: FaultSeverity::Warning,
            consecutive_samples: 1,
        };
        let critical = ThresholdRule {
            channel: SensorChannel::FeedingPressure,
            limit: 65.0,
            severity: FaultSeverity::Critical,
            consecutive_samples: 1,
        };
        let mut monitor = FaultMonitor::new(vec![warning, critical]);

        let snapshot = snapshot_with(SensorChannel::FeedingPressure, 70.0);
        let event = monitor.evaluate(&snapshot).expect("rules must fire");

        assert_eq!(event.severity, FaultSeverity::Critical);
        assert_eq!(monitor.conditions(), 0b11);
    }
}
