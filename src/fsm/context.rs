//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to. It carries the latest light sample, the motor command output,
//! timing, configuration, the phase-owned controller state, and an outbox
//! of things that happened this tick for the service to report. Think of it
//! as the "blackboard" in a blackboard architecture.

use heapless::Vec;
use log::warn;

use crate::config::{SensorSide, SystemConfig};
use crate::control::steering::SteeringController;
use crate::error::DecodeError;
use crate::morse::assembler::DecodedMessage;
use crate::morse::session::DecodeSession;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the service)
// ---------------------------------------------------------------------------

/// Both light sensors read at one instant.
///
/// Intensities are ambient-light percentages; `timestamp_ms` is monotonic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightSample {
    pub left: f32,
    pub right: f32,
    pub timestamp_ms: u64,
}

impl LightSample {
    pub fn new(left: f32, right: f32, timestamp_ms: u64) -> Self {
        Self {
            left,
            right,
            timestamp_ms,
        }
    }

    /// Total intensity, used for speed damping and arrival.
    pub fn magnitude(&self) -> f32 {
        self.left + self.right
    }

    /// The level of the chosen decode sensor.
    pub fn level(&self, side: SensorSide) -> f32 {
        match side {
            SensorSide::Left => self.left,
            SensorSide::Right => self.right,
            SensorSide::Brighter => self.left.max(self.right),
        }
    }
}

// ---------------------------------------------------------------------------
// Motor command (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Signed power for each drive motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringCommand {
    pub left: f32,
    pub right: f32,
}

impl SteeringCommand {
    pub fn straight(speed: f32) -> Self {
        Self {
            left: speed,
            right: speed,
        }
    }

    /// Both motors off.
    pub fn stop() -> Self {
        Self::straight(0.0)
    }

    pub fn is_stopped(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

impl Default for SteeringCommand {
    fn default() -> Self {
        Self::stop()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// Anomalies one tick can queue before further ones are dropped.
pub const TICK_ANOMALY_CAPACITY: usize = 8;

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Nominal tick duration in seconds.
    pub tick_period_secs: f32,
    /// Clock reading for this tick.
    pub now_ms: u64,
    /// When the current state was entered.
    pub state_entered_ms: u64,

    // -- Sensor data --
    /// Latest light sample. Updated before each FSM tick.
    pub sample: LightSample,

    // -- Actuator output --
    /// Motor command to apply after the FSM tick.
    pub command: SteeringCommand,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Phase state --
    /// Steering controller; reset on every entry into Seeking.
    pub steering: SteeringController,
    /// Open decode session; exists only while Decoding.
    pub session: Option<DecodeSession>,

    // -- Outbox (drained by the service after each tick) --
    /// Seeking ended because the source was reached.
    pub arrived: bool,
    /// Character decoded this tick.
    pub decoded: Option<char>,
    /// Recovered decode anomalies this tick.
    pub anomalies: Vec<DecodeError, TICK_ANOMALY_CAPACITY>,
    /// Message finalized this tick.
    pub finished: Option<DecodedMessage>,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            tick_period_secs: config.tick_secs(),
            now_ms: 0,
            state_entered_ms: 0,
            sample: LightSample::default(),
            command: SteeringCommand::stop(),
            steering: SteeringController::new(config.steering.clone()),
            session: None,
            config,
            arrived: false,
            decoded: None,
            anomalies: Vec::new(),
            finished: None,
        }
    }

    /// Swap in a validated configuration. Steering picks it up at once;
    /// Morse parameters apply from the next session.
    pub fn apply_config(&mut self, config: SystemConfig) {
        self.steering.reconfigure(config.steering.clone());
        self.tick_period_secs = config.tick_secs();
        self.config = config;
    }

    /// Milliseconds since the current state was entered.
    pub fn ms_in_state(&self) -> u64 {
        self.now_ms.saturating_sub(self.state_entered_ms)
    }

    /// Queue a recovered decode anomaly for reporting.
    pub fn push_anomaly(&mut self, error: DecodeError) {
        if self.anomalies.push(error).is_err() {
            warn!("anomaly queue full, dropping {error}");
        }
    }
}
