//! One Morse transmission, from the first reading to idle finalization.

use log::info;

use super::assembler::{DecodedMessage, MessageAssembler};
use super::classifier::PulseClassifier;
use super::edge::EdgeDetector;
use super::{MorseSymbol, PulseEvent};
use crate::config::MorseConfig;
use crate::error::DecodeError;

/// What a single input did to the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Pulse completed by this input.
    pub pulse: Option<PulseEvent>,
    /// Symbol the pulse classified to.
    pub symbol: Option<MorseSymbol>,
    /// Character appended to the message.
    pub decoded: Option<char>,
    /// Recovered anomaly, if any.
    pub anomaly: Option<DecodeError>,
}

/// Edge detector, classifier and assembler for one session.
#[derive(Debug, Clone)]
pub struct DecodeSession {
    edge: EdgeDetector,
    classifier: PulseClassifier,
    assembler: MessageAssembler,
    idle_timeout_ms: u64,
    word_gap_threshold: f32,
    last_activity_ms: u64,
}

impl DecodeSession {
    pub fn new(cfg: &MorseConfig, now_ms: u64) -> Self {
        Self {
            edge: EdgeDetector::new(cfg),
            classifier: PulseClassifier::new(cfg),
            assembler: MessageAssembler::new(cfg),
            idle_timeout_ms: u64::from(cfg.idle_timeout_ms),
            word_gap_threshold: cfg.word_gap_threshold,
            last_activity_ms: now_ms,
        }
    }

    /// Feed a raw light level sampled at `now_ms`.
    pub fn feed_level(&mut self, level: f32, now_ms: u64) -> StepReport {
        match self.edge.feed(level, now_ms) {
            Some(pulse) => self.feed_pulse(pulse, now_ms),
            None => StepReport::default(),
        }
    }

    /// Feed an already edge-detected pulse that ended at `now_ms`.
    pub fn feed_pulse(&mut self, pulse: PulseEvent, now_ms: u64) -> StepReport {
        let mut report = StepReport {
            pulse: Some(pulse),
            ..StepReport::default()
        };
        let symbol = match self.classifier.classify(pulse) {
            Ok(symbol) => symbol,
            Err(e) => {
                report.anomaly = Some(e);
                return report;
            }
        };
        self.last_activity_ms = now_ms;
        report.symbol = symbol;
        if let Some(symbol) = symbol {
            match self.assembler.push(symbol) {
                Ok(c) => report.decoded = c,
                Err(e) => report.anomaly = Some(e),
            }
        }
        report
    }

    /// Silence that ends the session: the configured idle timeout, but
    /// never less than two word gaps at the current unit, so a slow sender
    /// is not cut off between words.
    pub fn idle_limit_ms(&self) -> u64 {
        let word_gaps = self
            .unit_ms()
            .map_or(0, |unit| (2.0 * self.word_gap_threshold * unit) as u64);
        self.idle_timeout_ms.max(word_gaps)
    }

    /// No pulse for longer than [`idle_limit_ms`](Self::idle_limit_ms),
    /// with something to show for the session. An empty session never
    /// times out.
    pub fn is_idle(&self, now_ms: u64) -> bool {
        self.assembler.has_content()
            && now_ms.saturating_sub(self.last_activity_ms) > self.idle_limit_ms()
    }

    /// Text decoded so far.
    pub fn text(&self) -> &str {
        self.assembler.text()
    }

    pub fn unit_ms(&self) -> Option<f32> {
        self.classifier.unit_ms()
    }

    /// End the session. Consumes it, so a message is produced exactly once.
    pub fn finalize(self) -> DecodedMessage {
        let message = self.assembler.finalize();
        info!(
            "morse: session finalized \"{}\" ({} anomalies, {} pulses)",
            message,
            message.anomalies(),
            self.classifier.pulses_seen()
        );
        message
    }
}
