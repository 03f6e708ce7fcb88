//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns both light sensors, both drive motors, and a clock, exposing them
//! through [`SensorPort`] and [`MotorPort`]. This is the only module in
//! the system that touches actual hardware.
//!
//! Peripheral failures never reach the control loop: a failed sensor read
//! repeats the previous good value, a failed motor write is logged and
//! skipped.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ClockPort, MotorPort, SensorPort};
use crate::drivers::light::AmbientLight;
use crate::drivers::motor::HBridgeMotor;
use crate::error::Error;
use crate::fsm::context::LightSample;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, P, D, C> {
    left_sensor: S,
    right_sensor: S,
    left_motor: HBridgeMotor<P, D>,
    right_motor: HBridgeMotor<P, D>,
    clock: C,
    last_sample: LightSample,
    /// Consecutive failed reads/writes, so only the first of a run is logged.
    sensor_failures: u32,
    motor_failures: u32,
}

impl<S, P, D, C> HardwareAdapter<S, P, D, C>
where
    S: AmbientLight,
    P: SetDutyCycle,
    D: OutputPin,
    C: ClockPort,
{
    pub fn new(
        left_sensor: S,
        right_sensor: S,
        left_motor: HBridgeMotor<P, D>,
        right_motor: HBridgeMotor<P, D>,
        clock: C,
    ) -> Self {
        Self {
            left_sensor,
            right_sensor,
            left_motor,
            right_motor,
            clock,
            last_sample: LightSample::default(),
            sensor_failures: 0,
            motor_failures: 0,
        }
    }

    pub fn sensor_failures(&self) -> u32 {
        self.sensor_failures
    }

    pub fn motor_failures(&self) -> u32 {
        self.motor_failures
    }

    fn note_sensor(&mut self, side: &str, result: Result<f32, Error>, previous: f32) -> f32 {
        match result {
            Ok(v) => v,
            Err(e) => {
                if self.sensor_failures == 0 {
                    warn!("{side} light sensor: {e}, holding {previous:.1}");
                }
                self.sensor_failures = self.sensor_failures.saturating_add(1);
                previous
            }
        }
    }

    fn note_motor(&mut self, result: Result<(), Error>) {
        match result {
            Ok(()) => self.motor_failures = 0,
            Err(e) => {
                if self.motor_failures == 0 {
                    warn!("drive motors: {e}");
                }
                self.motor_failures = self.motor_failures.saturating_add(1);
            }
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S, P, D, C> SensorPort for HardwareAdapter<S, P, D, C>
where
    S: AmbientLight,
    P: SetDutyCycle,
    D: OutputPin,
    C: ClockPort,
{
    fn read_light(&mut self) -> LightSample {
        let prev = self.last_sample;
        let left = self.left_sensor.read_percent().map_err(Error::from);
        let right = self.right_sensor.read_percent().map_err(Error::from);
        let ok = left.is_ok() && right.is_ok();

        let left = self.note_sensor("left", left, prev.left);
        let right = self.note_sensor("right", right, prev.right);
        if ok {
            self.sensor_failures = 0;
        }

        self.last_sample = LightSample::new(left, right, self.clock.now_ms());
        self.last_sample
    }
}

// ── MotorPort implementation ──────────────────────────────────

impl<S, P, D, C> MotorPort for HardwareAdapter<S, P, D, C>
where
    S: AmbientLight,
    P: SetDutyCycle,
    D: OutputPin,
    C: ClockPort,
{
    fn set_power(&mut self, left: f32, right: f32) {
        let result = self
            .left_motor
            .set_power(left)
            .and_then(|()| self.right_motor.set_power(right))
            .map_err(Error::from);
        self.note_motor(result);
    }

    fn stop(&mut self) {
        // Attempt both even if the first fails.
        let left = self.left_motor.stop();
        let right = self.right_motor.stop();
        self.note_motor(left.and(right).map_err(Error::from));
    }
}
