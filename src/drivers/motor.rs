//! Drive motor driver (PWM + direction H-bridge).
//!
//! Signed power in percent (−100…100) maps to a PWM duty cycle and a
//! direction pin. One motor of the pair is usually mounted mirrored, so the
//! driver can invert its sense of "forward".
//!
//! Written against the `embedded-hal` 1.0 traits, so it runs on any HAL and
//! on host-side mock pins in tests.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::error::MotorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running { duty_percent: u8, dir: Direction },
}

pub struct HBridgeMotor<P, D> {
    pwm: P,
    dir: D,
    inverted: bool,
    state: MotorState,
}

impl<P, D> HBridgeMotor<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    pub fn new(pwm: P, dir: D, inverted: bool) -> Self {
        Self {
            pwm,
            dir,
            inverted,
            state: MotorState::Stopped,
        }
    }

    /// Drive at `power` percent; the sign selects the direction.
    pub fn set_power(&mut self, power: f32) -> Result<(), MotorError> {
        let power = if power.is_finite() {
            power.clamp(-100.0, 100.0)
        } else {
            0.0
        };
        let duty_percent = power.abs().round() as u8;
        if duty_percent == 0 {
            return self.stop();
        }

        let forward = (power > 0.0) != self.inverted;
        let dir = if power > 0.0 {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        self.set_direction_hw(forward)?;
        self.set_duty_hw(duty_percent)?;
        self.state = MotorState::Running { duty_percent, dir };
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), MotorError> {
        // Cut the duty first; direction only matters while driving.
        self.set_duty_hw(0)?;
        self.state = MotorState::Stopped;
        Ok(())
    }

    fn set_direction_hw(&mut self, forward: bool) -> Result<(), MotorError> {
        let res = if forward {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        };
        res.map_err(|_| {
            warn!("motor: direction pin write failed");
            MotorError::GpioWriteFailed
        })
    }

    fn set_duty_hw(&mut self, duty_percent: u8) -> Result<(), MotorError> {
        self.pwm.set_duty_cycle_percent(duty_percent).map_err(|_| {
            warn!("motor: PWM duty write failed ({duty_percent}%)");
            MotorError::PwmWriteFailed
        })
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, MotorState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[derive(Default)]
    struct MockPwm {
        duty: u16,
    }

    impl embedded_hal::pwm::ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPin {
        high: bool,
        broken: bool,
    }

    impl ErrorType for MockPin {
        type Error = ErrorKind;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn forward_power_sets_duty_and_direction() {
        let mut m = HBridgeMotor::new(MockPwm::default(), MockPin::default(), false);
        m.set_power(40.0).unwrap();
        assert_eq!(m.pwm.duty, 400);
        assert!(m.dir.high);
        assert_eq!(
            m.state(),
            MotorState::Running {
                duty_percent: 40,
                dir: Direction::Forward
            }
        );
    }

    #[test]
    fn reverse_power_lowers_direction_pin() {
        let mut m = HBridgeMotor::new(MockPwm::default(), MockPin::default(), false);
        m.set_power(-75.0).unwrap();
        assert_eq!(m.pwm.duty, 750);
        assert!(!m.dir.high);
    }

    #[test]
    fn inverted_motor_flips_pin_not_state() {
        let mut m = HBridgeMotor::new(MockPwm::default(), MockPin::default(), true);
        m.set_power(30.0).unwrap();
        assert!(!m.dir.high);
        assert!(matches!(
            m.state(),
            MotorState::Running {
                dir: Direction::Forward,
                ..
            }
        ));
    }

    #[test]
    fn power_is_clamped_and_nan_stops() {
        let mut m = HBridgeMotor::new(MockPwm::default(), MockPin::default(), false);
        m.set_power(250.0).unwrap();
        assert_eq!(m.pwm.duty, 1000);
        m.set_power(f32::NAN).unwrap();
        assert_eq!(m.pwm.duty, 0);
        assert!(!m.is_running());
    }

    #[test]
    fn pin_failure_reported() {
        let pin = MockPin {
            broken: true,
            ..MockPin::default()
        };
        let mut m = HBridgeMotor::new(MockPwm::default(), pin, false);
        assert_eq!(m.set_power(50.0), Err(MotorError::GpioWriteFailed));
        assert!(!m.is_running());
    }
}
