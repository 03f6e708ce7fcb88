//! Morse light-signal decoding.
//!
//! ```text
//!  light level ──▶ EdgeDetector ──▶ PulseEvent ──▶ PulseClassifier
//!                                                       │ MorseSymbol
//!                                                       ▼
//!                  DecodedMessage ◀── finalize ── MessageAssembler
//! ```
//!
//! [`DecodeSession`](session::DecodeSession) wires the stages together for
//! one transmission and owns the idle timeout that ends it.

pub mod assembler;
pub mod classifier;
pub mod edge;
pub mod encode;
pub mod session;
pub mod table;

/// A completed light pulse: the signal was `is_on` for `duration_ms`.
///
/// Valid pulses have `duration_ms > 0`; a zero duration (e.g. two edges
/// stamped in the same millisecond) is rejected by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEvent {
    pub is_on: bool,
    pub duration_ms: u32,
}

impl PulseEvent {
    pub const fn on(duration_ms: u32) -> Self {
        Self {
            is_on: true,
            duration_ms,
        }
    }

    pub const fn off(duration_ms: u32) -> Self {
        Self {
            is_on: false,
            duration_ms,
        }
    }
}

/// Output of the pulse classifier.
///
/// The short gap between the elements of one character is not a symbol;
/// the classifier swallows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseSymbol {
    Dot,
    Dash,
    /// End of a character.
    CharGap,
    /// End of a word.
    WordGap,
}

/// One element of a character's code, as stored in the code buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Dot,
    Dash,
}

impl Element {
    /// The conventional `.` / `-` spelling.
    pub const fn as_char(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Dash => '-',
        }
    }
}
