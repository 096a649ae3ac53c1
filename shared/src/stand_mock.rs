use std::sync::{Arc, Mutex};

use strum::EnumCount;

use crate::stand_hal::{
    ActuatorChannel, ActuatorInterface, OperatorButton, SensorChannel, SensorInterface,
};

struct MockInner {
    time_s: f32,
    raw: [f32; SensorChannel::COUNT],
    buttons: [bool; OperatorButton::COUNT],
    outputs: [bool; ActuatorChannel::COUNT],
}

/// Test double for the whole stand: hands out a sensor half and an
/// actuator half over one shared state, plus a handle the test drives.
pub struct MockStand {
    inner: Arc<Mutex<MockInner>>,
}

pub struct MockSensors {
    inner: Arc<Mutex<MockInner>>,
}

pub struct MockActuators {
    inner: Arc<Mutex<MockInner>>,
}

impl MockStand {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                time_s: 0.0,
                raw: [0.0; SensorChannel::COUNT],
                buttons: [false; OperatorButton::COUNT],
                outputs: [false; ActuatorChannel::COUNT],
            })),
        }
    }

    pub fn split(&self) -> (MockSensors, MockActuators) {
        (
            MockSensors {
                inner: self.inner.clone(),
            },
            MockActuators {
                inner: self.inner.clone(),
            },
        )
    }

    pub fn set_raw(&self, channel: SensorChannel, raw_v: f32) {
        self.lock().raw[channel.index()] = raw_v;
    }

    pub fn set_button(&self, button: OperatorButton, pressed: bool) {
        self.lock().buttons[button.index()] = pressed;
    }

    pub fn advance_time(&self, dt_s: f32) {
        self.lock().time_s += dt_s;
    }

    pub fn output(&self, actuator: ActuatorChannel) -> bool {
        self.lock().outputs[actuator.index()]
    }

    /// Flip a physical line behind the commanded record's back, for
    /// read-back mismatch tests.
    pub fn jam_output(&self, actuator: ActuatorChannel, state: bool) {
        self.lock().outputs[actuator.index()] = state;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().expect("mock stand lock poisoned")
    }
}

impl Default for MockStand {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorInterface for MockSensors {
    fn timestamp(&self) -> f32 {
        self.inner.lock().expect("mock stand lock poisoned").time_s
    }

    fn sample_raw(&mut self, channel: SensorChannel) -> f32 {
        self.inner.lock().expect("mock stand lock poisoned").raw[channel.index()]
    }

    fn read_button(&mut self, button: OperatorButton) -> bool {
        self.inner.lock().expect("mock stand lock poisoned").buttons[button.index()]
    }
}

impl ActuatorInterface for MockActuators {
    fn set_output(&mut self, actuator: ActuatorChannel, state: bool) {
        self.inner.lock().expect("mock stand lock poisoned").outputs[actuator.index()] = state;
    }

    fn read_output(&self, actuator: ActuatorChannel) -> bool {
        self.inner.lock().expect("mock stand lock poisoned").outputs[actuator.index()]
    }
}
