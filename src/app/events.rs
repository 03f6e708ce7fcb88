//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use crate::error::DecodeError;
use crate::fsm::StateId;
use crate::morse::assembler::DecodedMessage;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Seeking ended with the light source reached.
    Arrived { magnitude: f32 },

    /// A character was appended to the message being decoded.
    SymbolDecoded(char),

    /// A decode anomaly was recovered from.
    DecodeAnomaly(DecodeError),

    /// A decode session finalized; the message has been displayed.
    MessageDecoded(DecodedMessage),

    /// The service was stopped by command.
    Stopped,
}
