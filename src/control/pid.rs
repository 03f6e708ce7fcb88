//! PID controller for steering correction
//!
//! Proportional-integral-derivative controller acting directly on an error
//! signal (the left/right intensity difference), with a clamped integral
//! accumulator and a floored `dt` in the derivative term.

/// Individual contributions of the last [`PidController::update`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTerms {
    pub p: f32,
    pub i: f32,
    pub d: f32,
}

impl PidTerms {
    pub fn total(&self) -> f32 {
        self.p + self.i + self.d
    }
}

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    integral: f32,
    integral_limit: f32,
    prev_error: f32,
    min_dt: f32,
    last_terms: PidTerms,
}

impl PidController {
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            integral_limit: f32::MAX,
            prev_error: 0.0,
            min_dt: f32::EPSILON,
            last_terms: PidTerms::default(),
        }
    }

    /// Bound the integral accumulator to `[-limit, limit]`.
    pub fn set_integral_limit(&mut self, limit: f32) {
        self.integral_limit = limit.abs();
        self.integral = self.integral.clamp(-self.integral_limit, self.integral_limit);
    }

    /// Smallest `dt` the derivative term divides by.
    pub fn set_min_dt(&mut self, min_dt: f32) {
        self.min_dt = min_dt.max(f32::EPSILON);
    }

    /// Update the gains without touching accumulated state.
    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Compute the correction for `error` after `dt` seconds.
    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        let dt = dt.max(0.0);

        // Proportional
        let p = self.kp * error;

        // Integral (clamped against windup)
        self.integral = (self.integral + error * dt).clamp(-self.integral_limit, self.integral_limit);
        let i = self.ki * self.integral;

        // Derivative
        let d = self.kd * (error - self.prev_error) / dt.max(self.min_dt);

        self.prev_error = error;
        self.last_terms = PidTerms { p, i, d };
        self.last_terms.total()
    }

    /// Prime the derivative history so the first update after a (re)start
    /// does not see a step from zero.
    pub fn seed(&mut self, error: f32) {
        self.prev_error = error;
    }

    /// Drop the accumulated integral but keep the derivative history.
    pub fn clear_integral(&mut self) {
        self.integral = 0.0;
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.last_terms = PidTerms::default();
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn prev_error(&self) -> f32 {
        self.prev_error
    }

    pub fn last_terms(&self) -> PidTerms {
        self.last_terms
    }
}
