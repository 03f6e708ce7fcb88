//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (light sensors, motors, display, event sinks, config
//! storage, clocks) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! All calls are synchronous and expected to return quickly; the core runs
//! them from a single cooperative tick loop.

use crate::config::SystemConfig;
use crate::error::ConfigError;
use crate::fsm::context::LightSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    /// Most recent reading of both light sensors, stamped with a monotonic
    /// millisecond clock. Must not block.
    fn read_light(&mut self) -> LightSample;
}

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the two drive motors. The core never reads motor
/// state back.
pub trait MotorPort {
    /// Signed power per motor, within the configured power range.
    fn set_power(&mut self, left: f32, right: f32);

    /// Both motors off.
    fn stop(&mut self) {
        self.set_power(0.0, 0.0);
    }
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → light matrix)
// ───────────────────────────────────────────────────────────────

/// Built-in images the display can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Happy,
    Sad,
}

/// Fire-and-forget rendering on the light matrix.
pub trait DisplayPort {
    fn show_text(&mut self, text: &str);

    fn show_icon(&mut self, icon: Icon);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate values before persisting and reject
/// invalid ranges with [`ConfigError::ValidationFailed`] rather than
/// clamping them.
pub trait ConfigPort {
    /// Load configuration from storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}
