//! Simulated arena for host-side runs.
//!
//! A differential-drive robot on a plane with a single light source at the
//! origin. Each light sensor looks out at an angle either side of the
//! heading; its reading falls off with distance and with the angle between
//! the sensor and the source. The source shines steadily until the robot
//! has been standing still for a moment. It then goes dark for a word gap
//! and keys a Morse message. If the robot moves off before keying starts,
//! the countdown is abandoned.
//!
//! Time is simulated: every [`SensorPort::read_light`] advances the arena
//! clock by one tick and integrates the robot's motion over it.

use core::cell::Cell;
use core::f32::consts::PI;

use log::{debug, info};

use crate::app::ports::{ClockPort, MotorPort, SensorPort};
use crate::fsm::context::LightSample;
use crate::morse::PulseEvent;
use crate::morse::encode::encode;

/// Physical parameters of the arena and robot.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Robot start position (metres, source at the origin).
    pub start_x: f32,
    pub start_y: f32,
    /// Robot start heading (radians, counter-clockwise from +x).
    pub start_heading: f32,
    /// Wheel speed at 100 % power (m/s).
    pub max_wheel_speed: f32,
    /// Distance between the wheels (m).
    pub wheel_base: f32,
    /// Sensor look angle either side of the heading (radians).
    pub sensor_angle: f32,
    /// Reading with the source dark (%).
    pub ambient: f32,
    /// Extra reading when facing a lit source at zero distance (%).
    pub peak: f32,
    /// Distance at which the source contribution halves (m).
    pub falloff_m: f32,
    /// Stand-still time before the beacon goes dark and keying begins (ms).
    pub settle_ms: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            start_x: 1.2,
            start_y: 0.5,
            start_heading: PI,
            max_wheel_speed: 0.3,
            wheel_base: 0.12,
            sensor_angle: PI / 6.0,
            ambient: 5.0,
            peak: 90.0,
            falloff_m: 0.5,
            settle_ms: 500,
        }
    }
}

/// Where the transmitter is in its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transmitter {
    /// Shining steadily, waiting for the robot to stop.
    Beacon,
    /// Still shining, waiting for the robot to stay stopped.
    Settling { since_ms: u64 },
    /// Dark lead-in, then the message; started at the given time.
    Keying { started_ms: u64 },
    /// Message sent; the source stays dark.
    Done,
}

pub struct SimulatedArena {
    cfg: ArenaConfig,
    tick_ms: u64,
    /// Shared with the [`ClockPort`] impl, hence a `Cell`.
    now_ms: Cell<u64>,
    x: f32,
    y: f32,
    heading: f32,
    power: (f32, f32),
    still_since_ms: Option<u64>,
    script: Vec<PulseEvent>,
    transmitter: Transmitter,
}

impl SimulatedArena {
    pub fn new(cfg: ArenaConfig, message: &str, unit_ms: u32, tick_ms: u32) -> Self {
        let mut script = vec![PulseEvent::off(unit_ms.saturating_mul(7))];
        script.extend(encode(message, unit_ms));
        info!(
            "arena: robot at ({:.2}, {:.2}), message \"{}\" as {} pulses",
            cfg.start_x,
            cfg.start_y,
            message,
            script.len()
        );
        Self {
            x: cfg.start_x,
            y: cfg.start_y,
            heading: cfg.start_heading,
            cfg,
            tick_ms: u64::from(tick_ms.max(1)),
            now_ms: Cell::new(0),
            power: (0.0, 0.0),
            still_since_ms: None,
            script,
            transmitter: Transmitter::Beacon,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn distance_to_source(&self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn transmitter(&self) -> Transmitter {
        self.transmitter
    }

    /// Whether the source is lit at time `t`.
    ///
    /// The beacon keeps shining after the robot stops, so a reader that
    /// starts now sees a lit run of unknown length before the message.
    fn source_lit(&mut self, t: u64) -> bool {
        match self.transmitter {
            Transmitter::Beacon => match self.still_since_ms {
                Some(since) => {
                    debug!("arena: robot stopped, keying in {} ms", self.cfg.settle_ms);
                    self.transmitter = Transmitter::Settling { since_ms: since };
                    self.source_lit(t)
                }
                None => true,
            },
            Transmitter::Settling { since_ms } => {
                if self.still_since_ms.is_none() {
                    self.transmitter = Transmitter::Beacon;
                    return true;
                }
                if t.saturating_sub(since_ms) >= self.cfg.settle_ms {
                    info!("arena: robot settled, transmitter keying");
                    self.transmitter = Transmitter::Keying { started_ms: t };
                    return self.source_lit(t);
                }
                true
            }
            Transmitter::Keying { started_ms } => {
                let mut elapsed = t.saturating_sub(started_ms);
                for pulse in &self.script {
                    let d = u64::from(pulse.duration_ms);
                    if elapsed < d {
                        return pulse.is_on;
                    }
                    elapsed -= d;
                }
                info!("arena: transmission complete");
                self.transmitter = Transmitter::Done;
                false
            }
            Transmitter::Done => false,
        }
    }

    fn integrate(&mut self, dt_secs: f32) {
        let vl = self.power.0 / 100.0 * self.cfg.max_wheel_speed;
        let vr = self.power.1 / 100.0 * self.cfg.max_wheel_speed;
        let v = (vl + vr) / 2.0;
        let omega = (vr - vl) / self.cfg.wheel_base;
        self.heading = (self.heading + omega * dt_secs).rem_euclid(2.0 * PI);
        self.x += v * self.heading.cos() * dt_secs;
        self.y += v * self.heading.sin() * dt_secs;
    }

    fn sensor_reading(&self, offset: f32, lit: bool) -> f32 {
        if !lit {
            return self.cfg.ambient;
        }
        let d = self.distance_to_source();
        let bearing = (-self.y).atan2(-self.x);
        let delta = bearing - (self.heading + offset);
        let facing = 0.5 + 0.5 * delta.cos();
        let falloff = 1.0 / (1.0 + (d / self.cfg.falloff_m).powi(2));
        (self.cfg.ambient + self.cfg.peak * facing * falloff).clamp(0.0, 100.0)
    }
}

impl ClockPort for SimulatedArena {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

impl SensorPort for SimulatedArena {
    fn read_light(&mut self) -> LightSample {
        let t = self.now_ms.get() + self.tick_ms;
        self.now_ms.set(t);
        self.integrate(self.tick_ms as f32 / 1000.0);

        let lit = self.source_lit(t);
        let left = self.sensor_reading(self.cfg.sensor_angle, lit);
        let right = self.sensor_reading(-self.cfg.sensor_angle, lit);
        debug!(
            "arena t={} pos=({:.2}, {:.2}) hdg={:.0}° L={:.1} R={:.1}",
            t,
            self.x,
            self.y,
            self.heading.to_degrees(),
            left,
            right
        );
        LightSample::new(left, right, t)
    }
}

impl MotorPort for SimulatedArena {
    fn set_power(&mut self, left: f32, right: f32) {
        self.power = (left, right);
        let still = left == 0.0 && right == 0.0;
        match (still, self.still_since_ms) {
            (true, None) => self.still_since_ms = Some(self.now_ms.get()),
            (false, Some(_)) => self.still_since_ms = None,
            _ => {}
        }
    }
}
