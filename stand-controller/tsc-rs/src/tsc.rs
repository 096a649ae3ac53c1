use std::sync::Arc;

use shared::stand_hal::{
    ActuatorChannel, ControlStatus, FaultSeverity, FiringState, Mode, SensorSnapshot, StandCommand,
    StandConfig,
};
use shared::ControllerEntity;
use tracing::{info, warn};

use crate::actuators::ActuatorBank;
use crate::firing_fsm::FiringFsm;
use crate::interlock::{Interlock, InterlockEvent};
use crate::messages::MessageBoard;
use crate::mode_fsm::{self, ModeFsm};
use crate::schedule::FiringSchedule;
use crate::state_store::StateStore;

/// Test-stand controller: owns the mode machine and the firing sequencer,
/// and is polled at a fixed period by the control task.
pub struct Tsc {
    pub config: StandConfig,
    pub schedule: FiringSchedule,
    pub actuators: Arc<ActuatorBank>,
    pub store: Arc<StateStore>,
    pub interlock: Arc<Interlock>,
    pub messages: Arc<MessageBoard>,

    /// Copy of the newest acquisition-cycle snapshot; state handlers read
    /// buttons and pressures from here.
    pub snapshot: SensorSnapshot,

    pub mode: Option<ControllerEntity<ModeFsm, Tsc, Mode>>,
    pub firing: Option<ControllerEntity<FiringFsm, Tsc, FiringState>>,

    /// Seconds since the firing substate machine started; the single
    /// reference instant every schedule offset is measured from.
    pub sequence_elapsed_s: f32,

    last_status: ControlStatus,
}

impl Tsc {
    pub fn new(
        config: StandConfig,
        actuators: Arc<ActuatorBank>,
        store: Arc<StateStore>,
        interlock: Arc<Interlock>,
        messages: Arc<MessageBoard>,
    ) -> Self {
        let schedule = FiringSchedule::from_config(&config.sequence);

        let mut tsc = Self {
            config,
            schedule,
            actuators,
            store,
            interlock,
            messages,
            snapshot: SensorSnapshot::zeroed(),
            mode: None,
            firing: None,
            sequence_elapsed_s: 0.0,
            last_status: ControlStatus::startup(),
        };

        tsc.mode = Some(ControllerEntity::new(
            &mut tsc,
            mode_fsm::init::Init::new(),
        ));

        tsc
    }

    /// Latest acquisition-cycle result; the control task feeds this in
    /// before each `update`.
    pub fn ingest_snapshot(&mut self, snapshot: SensorSnapshot) {
        self.snapshot = snapshot;
    }

    /// One control tick: apply external commands, consume any pending
    /// interlock, advance the mode machine, publish status.
    pub fn update(&mut self, dt: f32, commands: &[StandCommand]) {
        for command in commands {
            self.apply_command(*command);
        }

        if let Some(event) = self.interlock.take() {
            self.apply_interlock(event);
        }

        if let Some(mut mode) = self.mode.take() {
            mode.update(self, dt);
            self.mode = Some(mode);
        }

        let status = self.build_status();
        if self.store.publish_status(status).is_err() {
            warn!("status publish skipped, store lock contended");
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
            .as_ref()
            .map(|fsm| fsm.hal_state())
            .unwrap_or(Mode::Init)
    }

    pub fn firing_state(&self) -> FiringState {
        self.firing
            .as_ref()
            .map(|fsm| fsm.hal_state())
            .unwrap_or(FiringState::AllOff)
    }

    /// Request a transition against the mode transition table. Illegal
    /// requests are rejected without a state change and reported.
    pub fn request_mode(&mut self, target: Mode, reason: &str) -> bool {
        let current = self.mode();

        if current == target {
            return true;
        }

        if !mode_fsm::transition_allowed(current, target) {
            warn!(?current, ?target, reason, "mode transition rejected");
            self.messages
                .append(&format!("rejected {current:?} -> {target:?}: {reason}"));
            return false;
        }

        info!(?current, ?target, reason, "mode transition");
        let fsm = mode_fsm::fsm_for(target);
        if let Some(mut mode) = self.mode.take() {
            mode.force(self, fsm);
            self.mode = Some(mode);
        }

        true
    }

    /// Reset the firing timeline and put the substate machine back at the
    /// start. Called when the mode machine enters `Sequence`.
    pub(crate) fn begin_sequence(&mut self) {
        self.sequence_elapsed_s = 0.0;
        let firing = ControllerEntity::new(self, crate::firing_fsm::all_off::AllOff::new());
        self.firing = Some(firing);
    }

    /// Command one output through the bank. Contention skips the write
    /// and is logged by the bank; outputs de-energize by default, so a
    /// skipped write is stale but safe.
    pub(crate) fn set_actuator(&self, actuator: ActuatorChannel, state: bool) {
        let _ = self.actuators.set(actuator, state);
    }

    fn apply_command(&mut self, command: StandCommand) {
        match command {
            StandCommand::Abort => {
                // De-energizing is the first observable effect of every
                // abort path, ahead of any reporting.
                self.actuators.safe_all();
                self.messages.append("operator abort");
                self.request_mode(Mode::Safe, "operator abort");
            }
            StandCommand::Reset => match self.mode() {
                Mode::Safe => {
                    self.interlock.request_reset();
                    self.request_mode(Mode::Wait, "operator reset");
                }
                Mode::Shutdown => {
                    self.interlock.request_reset();
                    self.request_mode(Mode::Init, "operator reset");
                }
                current => {
                    self.messages
                        .append(&format!("reset ignored in {current:?}"));
                }
            },
            StandCommand::StartTest => {
                self.request_mode(Mode::Test, "operator test request");
            }
            StandCommand::EndTest => {
                if self.mode() == Mode::Test {
                    self.request_mode(Mode::Wait, "operator test end");
                }
            }
        }
    }

    fn apply_interlock(&mut self, event: InterlockEvent) {
        let target = match event.severity {
            FaultSeverity::Warning => Mode::Safe,
            FaultSeverity::Critical => Mode::Shutdown,
        };

        self.messages.append(&format!(
            "interlock: {:?} at {:.1} exceeded limit {:.1}",
            event.channel, event.value, event.limit
        ));

        // Safety transitions are monotonic: repeats are no-ops and a
        // warning can never demote an established shutdown.
        self.request_mode(target, "interlock");
    }

    fn build_status(&mut self) -> ControlStatus {
        let mut status = self.last_status;

        status.timestamp_ms = self.snapshot.timestamp_ms;
        status.mode = self.mode();
        status.firing_state = self.firing_state();
        status.conditions = self.interlock.conditions();

        if let Ok(commanded) = self.actuators.commanded_all() {
            status.igniter_on = commanded[ActuatorChannel::Igniter.index()];
            status.main_valve_open = commanded[ActuatorChannel::MainValve.index()];
            status.dump_valve_open = commanded[ActuatorChannel::DumpValve.index()];
            status.feeding_valve_open = commanded[ActuatorChannel::FeedingValve.index()];
            status.heater_on = commanded[ActuatorChannel::Heater.index()];
        }

        self.last_status = status;
        status
    }
}
