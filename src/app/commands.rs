//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator,
//! serial console, test harness) that the
//! [`AppService`](super::service::AppService) interprets at a tick boundary.

use crate::config::SystemConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// (Re)start light following with fresh controller state.
    StartSeeking,

    /// Stop where we are and start a new decode session.
    StartDecoding,

    /// Abort the active phase and stop the motors.
    Stop,

    /// Hot-reload configuration. Rejected if it fails validation.
    UpdateConfig(SystemConfig),
}
