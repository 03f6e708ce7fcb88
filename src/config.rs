//! System configuration parameters
//!
//! All tunable parameters for the light seeker. Nothing in the control or
//! decode path hardcodes a gain or threshold; everything lives here with a
//! documented default. Values can be overridden from a JSON file via
//! [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile).
//!
//! A config that fails [`SystemConfig::validate`] is the only fatal error
//! in the system, and it is raised before the first tick.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::morse::assembler::MAX_CODE_LEN;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Give up seeking and start decoding after this long (0 = never)
    pub seek_timeout_ms: u32,
    /// Feedback steering parameters
    pub steering: SteeringConfig,
    /// Morse decoding parameters
    pub morse: MorseConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            control_loop_interval_ms: 20, // 50 Hz
            seek_timeout_ms: 20_000,
            steering: SteeringConfig::default(),
            morse: MorseConfig::default(),
        }
    }
}

/// Parameters of the light-following PID loop.
///
/// Intensities are ambient-light percentages (0–100 per sensor), so the
/// magnitude `left + right` spans 0–200. Motor power is a signed percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    // --- PID ---
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Integral accumulator clamp (±I_MAX, intensity·seconds)
    pub integral_limit: f32,
    /// Floor applied to `dt` in the derivative term (seconds)
    pub min_dt_secs: f32,

    // --- Motor range ---
    /// Lowest motor power command
    pub power_min: f32,
    /// Highest motor power command
    pub power_max: f32,

    // --- Speed shaping ---
    /// Forward power held while the source is still far away
    pub cruise_speed: f32,
    /// Magnitude above which forward speed starts to drop
    pub damping_start: f32,
    /// Magnitude at which forward speed reaches zero
    pub damping_full: f32,

    // --- Edge policy ---
    /// Both sensors below this ⇒ hold the last command
    pub noise_floor: f32,
    /// Either sensor at or above this ⇒ stop
    pub saturation_ceiling: f32,

    // --- Arrival ---
    /// Magnitude that counts as "close enough"
    pub arrival_threshold: f32,
    /// Consecutive close ticks required before seeking ends
    pub arrival_ticks: u32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            kp: 0.8,
            ki: 0.05,
            kd: 0.02,
            integral_limit: 200.0,
            min_dt_secs: 0.005,

            power_min: -100.0,
            power_max: 100.0,

            cruise_speed: 50.0,
            damping_start: 80.0,
            damping_full: 180.0,

            noise_floor: 3.0,
            saturation_ceiling: 95.0,

            arrival_threshold: 150.0,
            arrival_ticks: 5,
        }
    }
}

/// How the Morse unit (dot length) is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    /// Always use [`MorseConfig::unit_ms`].
    Fixed,
    /// Learn the unit from the ON pulses of the current session.
    Adaptive,
}

/// Which sensor carries the Morse signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorSide {
    Left,
    Right,
    /// Whichever sensor reads brighter on each sample.
    Brighter,
}

/// Parameters of the Morse pulse classifier and message assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorseConfig {
    // --- Timing ---
    /// Fixed unit mode or adaptive estimation
    pub unit_mode: UnitMode,
    /// Dot length in milliseconds (used in `Fixed` mode)
    pub unit_ms: u32,
    /// ON pulse longer than this many units is a dash
    pub dash_threshold: f32,
    /// OFF pulse longer than this many units ends a character
    pub char_gap_threshold: f32,
    /// OFF pulse longer than this many units ends a word
    pub word_gap_threshold: f32,
    /// EMA factor for the adaptive unit estimate (0 < α ≤ 1)
    pub adaptive_smoothing: f32,
    /// Silence after which the session finalizes (milliseconds)
    pub idle_timeout_ms: u32,

    // --- Signal ---
    /// Sensor whose level is decoded
    pub decode_sensor: SensorSide,
    /// Light level separating ON from OFF
    pub light_on_threshold: f32,
    /// Half-width of the hysteresis band around the threshold
    pub light_hysteresis: f32,

    // --- Assembly ---
    /// Longest accepted code before a forced flush
    pub max_symbols: usize,
    /// Character written for an unrecognized code
    pub placeholder: char,
}

impl Default for MorseConfig {
    fn default() -> Self {
        Self {
            unit_mode: UnitMode::Adaptive,
            unit_ms: 250,
            dash_threshold: 2.0,
            char_gap_threshold: 2.0,
            word_gap_threshold: 6.0,
            adaptive_smoothing: 0.2,
            idle_timeout_ms: 3000,

            decode_sensor: SensorSide::Left,
            light_on_threshold: 50.0,
            light_hysteresis: 5.0,

            max_symbols: 6,
            placeholder: '?',
        }
    }
}

impl SystemConfig {
    /// Reject configurations the controller cannot run with.
    ///
    /// Called once at startup and on every runtime config update; the
    /// first failing rule is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be > 0",
            ));
        }
        self.steering.validate()?;
        self.morse.validate()
    }

    /// Control tick period in seconds.
    pub fn tick_secs(&self) -> f32 {
        self.control_loop_interval_ms as f32 / 1000.0
    }
}

impl SteeringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = self;
        let fields = [
            s.kp,
            s.ki,
            s.kd,
            s.integral_limit,
            s.min_dt_secs,
            s.power_min,
            s.power_max,
            s.cruise_speed,
            s.damping_start,
            s.damping_full,
            s.noise_floor,
            s.saturation_ceiling,
            s.arrival_threshold,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("steering values must be finite"));
        }
        if s.kp <= 0.0 {
            return Err(ConfigError::ValidationFailed("kp must be > 0"));
        }
        if s.ki < 0.0 || s.kd < 0.0 {
            return Err(ConfigError::ValidationFailed("ki and kd must be >= 0"));
        }
        if s.integral_limit <= 0.0 {
            return Err(ConfigError::ValidationFailed("integral_limit must be > 0"));
        }
        if s.min_dt_secs <= 0.0 {
            return Err(ConfigError::ValidationFailed("min_dt_secs must be > 0"));
        }
        if s.power_min > 0.0 || s.power_max <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "power range must contain zero: power_min <= 0 < power_max",
            ));
        }
        if s.cruise_speed <= 0.0 || s.cruise_speed > s.power_max {
            return Err(ConfigError::ValidationFailed(
                "cruise_speed must be in (0, power_max]",
            ));
        }
        if s.damping_start >= s.damping_full {
            return Err(ConfigError::ValidationFailed(
                "damping_start must be below damping_full",
            ));
        }
        if s.noise_floor < 0.0 || s.noise_floor >= s.saturation_ceiling {
            return Err(ConfigError::ValidationFailed(
                "noise_floor must be in [0, saturation_ceiling)",
            ));
        }
        if s.arrival_threshold <= 0.0 {
            return Err(ConfigError::ValidationFailed("arrival_threshold must be > 0"));
        }
        if s.arrival_ticks == 0 {
            return Err(ConfigError::ValidationFailed("arrival_ticks must be >= 1"));
        }
        Ok(())
    }
}

impl MorseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = self;
        if m.unit_ms == 0 {
            return Err(ConfigError::ValidationFailed("unit_ms must be > 0"));
        }
        if !(m.dash_threshold.is_finite() && m.dash_threshold > 0.0) {
            return Err(ConfigError::ValidationFailed("dash_threshold must be > 0"));
        }
        if !(m.char_gap_threshold.is_finite() && m.char_gap_threshold > 0.0) {
            return Err(ConfigError::ValidationFailed("char_gap_threshold must be > 0"));
        }
        if !(m.word_gap_threshold.is_finite() && m.word_gap_threshold > m.char_gap_threshold) {
            return Err(ConfigError::ValidationFailed(
                "word_gap_threshold must exceed char_gap_threshold",
            ));
        }
        if !(m.adaptive_smoothing > 0.0 && m.adaptive_smoothing <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "adaptive_smoothing must be in (0, 1]",
            ));
        }
        if m.idle_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("idle_timeout_ms must be > 0"));
        }
        if m.unit_mode == UnitMode::Fixed
            && m.idle_timeout_ms as f32 <= m.word_gap_threshold * m.unit_ms as f32
        {
            return Err(ConfigError::ValidationFailed(
                "idle_timeout_ms must exceed the word gap",
            ));
        }
        if !(m.light_on_threshold.is_finite() && m.light_hysteresis.is_finite())
            || m.light_hysteresis < 0.0
        {
            return Err(ConfigError::ValidationFailed(
                "light threshold and hysteresis must be finite, hysteresis >= 0",
            ));
        }
        if m.max_symbols == 0 || m.max_symbols > MAX_CODE_LEN {
            return Err(ConfigError::ValidationFailed(
                "max_symbols must be in 1..=MAX_CODE_LEN",
            ));
        }
        if m.placeholder.is_whitespace() {
            return Err(ConfigError::ValidationFailed(
                "placeholder must be visible",
            ));
        }
        Ok(())
    }
}
