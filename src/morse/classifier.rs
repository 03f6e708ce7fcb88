//! Pulse classifier: pulse durations → Morse symbols.
//!
//! Every duration is judged against the current unit (dot length):
//!
//! | Pulse | Duration (units)                  | Symbol           |
//! |-------|-----------------------------------|------------------|
//! | ON    | `≤ dash_threshold`                | `Dot`            |
//! | ON    | `> dash_threshold`                | `Dash`           |
//! | OFF   | `≤ char_gap_threshold`            | none (intra gap) |
//! | OFF   | `≤ word_gap_threshold`            | `CharGap`        |
//! | OFF   | `> word_gap_threshold`            | `WordGap`        |
//!
//! The unit is either fixed by configuration or learned by
//! [`UnitEstimator`] from the ON pulses of the session.

use log::{debug, warn};

use super::{MorseSymbol, PulseEvent};
use crate::config::{MorseConfig, UnitMode};
use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// Unit estimation
// ---------------------------------------------------------------------------

/// Running estimate of the Morse unit.
///
/// In adaptive mode the first ON pulse becomes the baseline. After that,
/// each ON pulse nudges the estimate by an exponential moving average:
/// a dot pulls it toward its own length, a dash toward a third of its
/// length. A pulse shorter than half the estimate means the baseline was
/// taken from a dash, so the estimate snaps down to it.
#[derive(Debug, Clone)]
pub struct UnitEstimator {
    mode: UnitMode,
    fixed_ms: f32,
    alpha: f32,
    estimate_ms: Option<f32>,
}

impl UnitEstimator {
    pub fn new(cfg: &MorseConfig) -> Self {
        Self {
            mode: cfg.unit_mode,
            fixed_ms: cfg.unit_ms as f32,
            alpha: cfg.adaptive_smoothing,
            estimate_ms: None,
        }
    }

    /// Current unit, or `None` before the first ON pulse in adaptive mode.
    pub fn unit_ms(&self) -> Option<f32> {
        match self.mode {
            UnitMode::Fixed => Some(self.fixed_ms),
            UnitMode::Adaptive => self.estimate_ms,
        }
    }

    /// Feed a classified ON pulse into the estimate.
    pub fn observe_on(&mut self, duration_ms: f32, was_dash: bool) {
        if self.mode == UnitMode::Fixed {
            return;
        }
        let next = match self.estimate_ms {
            None => duration_ms,
            Some(unit) if duration_ms < 0.5 * unit => duration_ms,
            Some(unit) => {
                let target = if was_dash {
                    duration_ms / 3.0
                } else {
                    duration_ms
                };
                (1.0 - self.alpha) * unit + self.alpha * target
            }
        };
        self.estimate_ms = Some(next);
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Classifies one [`PulseEvent`] at a time.
#[derive(Debug, Clone)]
pub struct PulseClassifier {
    unit: UnitEstimator,
    dash_threshold: f32,
    char_gap_threshold: f32,
    word_gap_threshold: f32,
    pulses_seen: u32,
}

impl PulseClassifier {
    pub fn new(cfg: &MorseConfig) -> Self {
        Self {
            unit: UnitEstimator::new(cfg),
            dash_threshold: cfg.dash_threshold,
            char_gap_threshold: cfg.char_gap_threshold,
            word_gap_threshold: cfg.word_gap_threshold,
            pulses_seen: 0,
        }
    }

    /// Classify a pulse. `Ok(None)` means the pulse carries no symbol
    /// (an intra-character gap, or silence before the unit is known).
    ///
    /// A zero-length pulse fails with [`DecodeError::InvalidPulse`] and
    /// leaves the classifier untouched.
    pub fn classify(&mut self, pulse: PulseEvent) -> Result<Option<MorseSymbol>, DecodeError> {
        if pulse.duration_ms == 0 {
            warn!("classifier: discarding zero-length {} pulse", on_off(pulse.is_on));
            return Err(DecodeError::InvalidPulse);
        }
        self.pulses_seen = self.pulses_seen.saturating_add(1);
        let d = pulse.duration_ms as f32;

        let symbol = if pulse.is_on {
            // The very first adaptive pulse is measured against itself.
            let unit = self.unit.unit_ms().unwrap_or(d);
            let symbol = if d <= self.dash_threshold * unit {
                MorseSymbol::Dot
            } else {
                MorseSymbol::Dash
            };
            self.unit.observe_on(d, symbol == MorseSymbol::Dash);
            Some(symbol)
        } else {
            match self.unit.unit_ms() {
                None => None,
                Some(unit) if d <= self.char_gap_threshold * unit => None,
                Some(unit) if d <= self.word_gap_threshold * unit => Some(MorseSymbol::CharGap),
                Some(_) => Some(MorseSymbol::WordGap),
            }
        };

        debug!(
            "classifier: {} {}ms -> {:?} (unit {:?})",
            on_off(pulse.is_on),
            pulse.duration_ms,
            symbol,
            self.unit.unit_ms()
        );
        Ok(symbol)
    }

    /// Current unit estimate in milliseconds.
    pub fn unit_ms(&self) -> Option<f32> {
        self.unit.unit_ms()
    }

    /// Valid pulses classified so far.
    pub fn pulses_seen(&self) -> u32 {
        self.pulses_seen
    }
}

fn on_off(is_on: bool) -> &'static str {
    if is_on { "ON" } else { "OFF" }
}
