//! Light-following steering controller.
//!
//! Turns a pair of light intensities into left/right motor power:
//!
//! ```text
//!  error      = left − right            (positive ⇒ source is to the left)
//!  correction = PID(error, dt)
//!  base       = f(left + right)         (cruise, then damped to 0 near the source)
//!  left_pwr   = clamp(base − correction)
//!  right_pwr  = clamp(base + correction)
//! ```
//!
//! Two edge policies override the loop: when both sensors sit under the
//! noise floor the last command is held, and when either sensor saturates
//! the robot stops. Arrival is declared only after the magnitude has stayed
//! above the "close enough" threshold for a configured number of ticks.

use log::{debug, info};

use crate::config::SteeringConfig;
use crate::control::pid::PidController;
use crate::fsm::context::{LightSample, SteeringCommand};

/// Which branch of the steering policy produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringCondition {
    /// Normal closed-loop tracking.
    Tracking,
    /// Both sensors under the noise floor; last command held.
    NoiseHold,
    /// A sensor is saturated; motors stopped.
    Saturated,
}

/// Result of one steering tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringOutput {
    pub command: SteeringCommand,
    pub condition: SteeringCondition,
    /// PID correction applied this tick (0 unless tracking).
    pub correction: f32,
    /// The close-enough condition has held for `arrival_ticks` ticks.
    pub arrived: bool,
}

/// Closed-loop steering toward the brighter side.
#[derive(Debug, Clone)]
pub struct SteeringController {
    cfg: SteeringConfig,
    pid: PidController,
    last_timestamp_ms: Option<u64>,
    last_command: SteeringCommand,
    close_ticks: u32,
    /// The PID has seen at least one tracking error since the last reset.
    primed: bool,
}

impl SteeringController {
    pub fn new(cfg: SteeringConfig) -> Self {
        let mut pid = PidController::new(cfg.kp, cfg.ki, cfg.kd);
        pid.set_integral_limit(cfg.integral_limit);
        pid.set_min_dt(cfg.min_dt_secs);
        let last_command = SteeringCommand::straight(cfg.cruise_speed);
        Self {
            cfg,
            pid,
            last_timestamp_ms: None,
            last_command,
            close_ticks: 0,
            primed: false,
        }
    }

    /// Swap in new tuning. Accumulated state is kept; the integral is
    /// re-clamped to the new bound.
    pub fn reconfigure(&mut self, cfg: SteeringConfig) {
        self.pid.set_gains(cfg.kp, cfg.ki, cfg.kd);
        self.pid.set_integral_limit(cfg.integral_limit);
        self.pid.set_min_dt(cfg.min_dt_secs);
        self.cfg = cfg;
    }

    /// Forget everything learned since the last start.
    pub fn reset(&mut self) {
        self.pid.reset();
        self.last_timestamp_ms = None;
        self.last_command = SteeringCommand::straight(self.cfg.cruise_speed);
        self.close_ticks = 0;
        self.primed = false;
    }

    /// Run one tick, deriving `dt` from the previous sample's timestamp.
    /// The first tick after a reset uses `fallback_dt_secs`.
    pub fn step_at(&mut self, sample: &LightSample, fallback_dt_secs: f32) -> SteeringOutput {
        let dt = match self.last_timestamp_ms {
            Some(prev) => sample.timestamp_ms.saturating_sub(prev) as f32 / 1000.0,
            None => fallback_dt_secs,
        };
        self.step(sample, dt)
    }

    /// Run one tick with an explicit `dt` in seconds.
    pub fn step(&mut self, sample: &LightSample, dt_secs: f32) -> SteeringOutput {
        self.last_timestamp_ms = Some(sample.timestamp_ms);

        let valid = sample.left.is_finite() && sample.right.is_finite();
        let magnitude = sample.magnitude();
        let saturated = valid
            && (sample.left >= self.cfg.saturation_ceiling
                || sample.right >= self.cfg.saturation_ceiling);

        let close = saturated || (valid && magnitude >= self.cfg.arrival_threshold);
        self.close_ticks = if close {
            self.close_ticks.saturating_add(1)
        } else {
            0
        };
        let arrived = self.close_ticks >= self.cfg.arrival_ticks;

        let (command, condition, correction) = if saturated {
            // Sitting on the source: stop, and don't let the integral push us off it.
            self.pid.clear_integral();
            (SteeringCommand::stop(), SteeringCondition::Saturated, 0.0)
        } else if !valid
            || (sample.left < self.cfg.noise_floor && sample.right < self.cfg.noise_floor)
        {
            (self.last_command, SteeringCondition::NoiseHold, 0.0)
        } else {
            let error = sample.left - sample.right;
            if !self.primed {
                self.pid.seed(error);
                self.primed = true;
            }
            let correction = self.pid.update(error, dt_secs);
            let base = self.base_speed(magnitude);
            let command = SteeringCommand {
                left: self.clamp_power(base - correction),
                right: self.clamp_power(base + correction),
            };
            (command, SteeringCondition::Tracking, correction)
        };

        if condition != SteeringCondition::NoiseHold {
            self.last_command = command;
        }

        debug!(
            "steer L={:.1} R={:.1} err={:.1} corr={:.2} -> ({:.1}, {:.1}) {:?}",
            sample.left,
            sample.right,
            sample.left - sample.right,
            correction,
            command.left,
            command.right,
            condition
        );
        if arrived && self.close_ticks == self.cfg.arrival_ticks {
            info!(
                "steering: source reached (magnitude {:.1} for {} ticks)",
                magnitude, self.close_ticks
            );
        }

        SteeringOutput {
            command,
            condition,
            correction,
            arrived,
        }
    }

    /// Forward speed for a given total intensity. Non-increasing in
    /// `magnitude`: cruise while far, linear ramp to zero across the
    /// damping band.
    pub fn base_speed(&self, magnitude: f32) -> f32 {
        let start = self.cfg.damping_start;
        let full = self.cfg.damping_full;
        if magnitude <= start {
            self.cfg.cruise_speed
        } else if magnitude >= full {
            0.0
        } else {
            self.cfg.cruise_speed * (full - magnitude) / (full - start)
        }
    }

    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }

    pub fn previous_error(&self) -> f32 {
        self.pid.prev_error()
    }

    pub fn last_timestamp_ms(&self) -> Option<u64> {
        self.last_timestamp_ms
    }

    pub fn last_command(&self) -> SteeringCommand {
        self.last_command
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.cfg
    }

    fn clamp_power(&self, power: f32) -> f32 {
        power.clamp(self.cfg.power_min, self.cfg.power_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    fn sample(left: f32, right: f32, t: u64) -> LightSample {
        LightSample {
            left,
            right,
            timestamp_ms: t,
        }
    }

    fn controller() -> SteeringController {
        SteeringController::new(SteeringConfig::default())
    }

    #[test]
    fn brighter_left_slows_left_motor() {
        let mut c = controller();
        for i in 0..10 {
            let out = c.step(&sample(80.0, 20.0, i * 20), DT);
            assert_eq!(out.condition, SteeringCondition::Tracking);
            assert!(
                out.command.left < out.command.right,
                "tick {i}: {:?}",
                out.command
            );
        }
    }

    #[test]
    fn brighter_right_slows_right_motor() {
        let mut c = controller();
        let out = c.step(&sample(20.0, 70.0, 0), DT);
        assert!(out.command.right < out.command.left);
    }

    #[test]
    fn converges_as_intensities_equalize() {
        let mut c = controller();
        let mut t = 0;
        let first = c.step(&sample(80.0, 20.0, t), DT);
        let first_gap = first.command.right - first.command.left;

        // Ramp the sensors together, then hold them level.
        for k in 1..=10 {
            t += 20;
            let d = 3.0 * k as f32;
            c.step(&sample(80.0 - d, 20.0 + d, t), DT);
        }
        let mut last = first;
        for _ in 0..10 {
            t += 20;
            last = c.step(&sample(50.0, 50.0, t), DT);
        }
        let last_gap = (last.command.right - last.command.left).abs();
        assert!(last_gap < first_gap);
        assert!(last_gap < 5.0, "residual imbalance {last_gap}");
    }

    #[test]
    fn commands_stay_in_power_range() {
        let mut c = controller();
        let cfg = SteeringConfig::default();
        for i in 0..50 {
            let out = c.step(&sample(94.0, 4.0, i * 20), 0.0);
            for p in [out.command.left, out.command.right] {
                assert!(p >= cfg.power_min && p <= cfg.power_max);
            }
        }
    }

    #[test]
    fn noise_floor_holds_last_command() {
        let mut c = controller();
        let tracked = c.step(&sample(60.0, 30.0, 0), DT);
        let integral = c.integral();
        let held = c.step(&sample(1.0, 2.0, 20), DT);
        assert_eq!(held.condition, SteeringCondition::NoiseHold);
        assert_eq!(held.command, tracked.command);
        assert_eq!(c.integral(), integral);
    }

    #[test]
    fn noise_before_any_reading_cruises_straight() {
        let mut c = controller();
        let out = c.step(&sample(0.0, 0.0, 0), DT);
        assert_eq!(out.command, SteeringCommand::straight(50.0));
    }

    #[test]
    fn nan_reading_is_treated_as_noise() {
        let mut c = controller();
        let out = c.step(&sample(f32::NAN, 40.0, 0), DT);
        assert_eq!(out.condition, SteeringCondition::NoiseHold);
    }

    #[test]
    fn saturation_stops_and_clears_integral() {
        let mut c = controller();
        for i in 0..5 {
            c.step(&sample(70.0, 40.0, i * 20), DT);
        }
        assert!(c.integral() > 0.0);
        let out = c.step(&sample(96.0, 60.0, 200), DT);
        assert_eq!(out.condition, SteeringCondition::Saturated);
        assert_eq!(out.command, SteeringCommand::stop());
        assert_eq!(c.integral(), 0.0);
    }

    #[test]
    fn base_speed_damps_monotonically() {
        let c = controller();
        let mut prev = f32::MAX;
        for m in 0..=200 {
            let s = c.base_speed(m as f32);
            assert!(s <= prev);
            prev = s;
        }
        assert_eq!(c.base_speed(10.0), 50.0);
        assert_eq!(c.base_speed(190.0), 0.0);
    }

    #[test]
    fn arrival_needs_consecutive_close_ticks() {
        let mut c = controller();
        for i in 0..4 {
            assert!(!c.step(&sample(80.0, 80.0, i * 20), DT).arrived);
        }
        // A transient dip resets the count.
        assert!(!c.step(&sample(40.0, 40.0, 80), DT).arrived);
        for i in 0..4 {
            assert!(!c.step(&sample(80.0, 80.0, 100 + i * 20), DT).arrived);
        }
        assert!(c.step(&sample(80.0, 80.0, 180), DT).arrived);
    }

    #[test]
    fn step_at_derives_dt_from_timestamps() {
        let mut c = controller();
        c.step_at(&sample(60.0, 40.0, 1000), DT);
        c.step_at(&sample(60.0, 40.0, 1500), DT);
        // Two ticks: first uses the fallback, second 0.5 s.
        let expected = 20.0 * DT + 20.0 * 0.5;
        assert!((c.integral() - expected).abs() < 1e-4);
        assert_eq!(c.last_timestamp_ms(), Some(1500));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut c = controller();
        c.step(&sample(70.0, 20.0, 0), DT);
        c.reset();
        assert_eq!(c.integral(), 0.0);
        assert_eq!(c.previous_error(), 0.0);
        assert_eq!(c.last_timestamp_ms(), None);
    }
}
