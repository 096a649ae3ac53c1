use shared::stand_hal::{ActuatorChannel, SequenceConfig};

/// One scheduled actuator transition, at an absolute offset in seconds
/// from sequence start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub offset_s: f32,
    pub actuator: ActuatorChannel,
    pub energize: bool,
}

/// The firing timeline. Every offset is measured from the single
/// sequence-start instant rather than from the previous event, so the
/// schedule can be audited against one reference time and late polling
/// cannot compound drift across chained delays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiringSchedule {
    pub ignition_on_s: f32,
    pub valve_on_s: f32,
    pub ignition_off_s: f32,
    pub valve_off_s: f32,
    pub finished_s: f32,
}

impl FiringSchedule {
    pub fn from_config(config: &SequenceConfig) -> Self {
        // Valves open partway through the igniter burn so propellant
        // arrives while the charge is still hot.
        let valve_on_s = config.igniter_delay_s + config.igniter_burn_s / 2.0;
        let ignition_off_s = config.igniter_burn_s;
        let valve_off_s = valve_on_s + config.burn_duration_s;
        let finished_s = valve_off_s + config.cooldown_s;

        Self {
            ignition_on_s: 0.0,
            valve_on_s,
            ignition_off_s,
            valve_off_s,
            finished_s,
        }
    }

    /// The timeline as an ordered event list.
    pub fn events(&self) -> [ScheduleEntry; 6] {
        [
            ScheduleEntry {
                offset_s: self.ignition_on_s,
                actuator: ActuatorChannel::Igniter,
                energize: true,
            },
            ScheduleEntry {
                offset_s: self.valve_on_s,
                actuator: ActuatorChannel::MainValve,
                energize: true,
            },
            ScheduleEntry {
                offset_s: self.valve_on_s,
                actuator: ActuatorChannel::FeedingValve,
                energize: true,
            },
            ScheduleEntry {
                offset_s: self.ignition_off_s,
                actuator: ActuatorChannel::Igniter,
                energize: false,
            },
            ScheduleEntry {
                offset_s: self.valve_off_s,
                actuator: ActuatorChannel::MainValve,
                energize: false,
            },
            ScheduleEntry {
                offset_s: self.valve_off_s,
                actuator: ActuatorChannel::FeedingValve,
                energize: false,
            },
        ]
    }

    /// A usable schedule advances strictly through the firing substates:
    /// igniter on, valves on during the burn, igniter off, valves off,
    /// then cooldown.
    pub fn is_ordered(&self) -> bool {
        self.ignition_on_s == 0.0
            && self.ignition_on_s <= self.valve_on_s
            && self.valve_on_s <= self.ignition_off_s
            && self.ignition_off_s <= self.valve_off_s
            && self.valve_off_s <= self.finished_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_offsets_from_config() {
        let schedule = FiringSchedule::from_config(&SequenceConfig {
            igniter_delay_s: 0.05,
            igniter_burn_s: 0.9,
            burn_duration_s: 7.0,
            cooldown_s: 10.0,
        });

        assert_eq!(schedule.ignition_on_s, 0.0);
        assert!((schedule.valve_on_s - 0.5).abs() < 1e-6);
        assert!((schedule.ignition_off_s - 0.9).abs() < 1e-6);
        assert!((schedule.valve_off_s - 7.5).abs() < 1e-6);
        assert!((schedule.finished_s - 17.5).abs() < 1e-6);
        assert!(schedule.is_ordered());
    }

    #[test]
    fn default_config_is_ordered() {
        assert!(FiringSchedule::from_config(&SequenceConfig::default()).is_ordered());
    }

    #[test]
    fn events_are_monotonic_in_time() {
        let schedule = FiringSchedule::from_config(&SequenceConfig::default());

        let events = schedule.events();
        for pair in events.windows(2) {
            assert!(pair[0].offset_s <= pair[1].offset_s);
        }
    }

    #[test]
    fn unordered_config_is_rejected() {
        // An igniter burn shorter than twice its delay would put valve-on
        // after igniter-off.
        let schedule = FiringSchedule::from_config(&SequenceConfig {
            igniter_delay_s: 2.0,
            igniter_burn_s: 0.5,
            burn_duration_s: 7.0,
            cooldown_s: 10.0,
        });

        assert!(!schedule.is_ordered());
    }
}
