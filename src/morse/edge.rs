//! Light level → on/off pulses.
//!
//! A Schmitt-style trigger: the signal turns ON above
//! `threshold + hysteresis` and OFF below `threshold - hysteresis`, so
//! sensor jitter around the threshold does not produce phantom edges.
//! Each transition closes the previous run as a [`PulseEvent`]. The run
//! in progress at the first reading has no observed start, so it is never
//! reported, whichever level it was.

use super::PulseEvent;
use crate::config::MorseConfig;

#[derive(Debug, Clone)]
pub struct EdgeDetector {
    threshold: f32,
    hysteresis: f32,
    /// Current level and when it began.
    state: Option<(bool, u64)>,
    /// An edge has been observed.
    bounded: bool,
}

impl EdgeDetector {
    pub fn new(cfg: &MorseConfig) -> Self {
        Self {
            threshold: cfg.light_on_threshold,
            hysteresis: cfg.light_hysteresis.max(0.0),
            state: None,
            bounded: false,
        }
    }

    /// Feed one light reading taken at `now_ms`.
    ///
    /// Returns the pulse that just ended, if this reading crossed the
    /// trigger band. Only runs bounded by two observed edges are pulses,
    /// so the run in progress at the first reading is dropped. Non-finite
    /// readings are ignored.
    pub fn feed(&mut self, level: f32, now_ms: u64) -> Option<PulseEvent> {
        if !level.is_finite() {
            return None;
        }
        let Some((on, since)) = self.state else {
            self.state = Some((level >= self.threshold, now_ms));
            return None;
        };

        let flipped = if on {
            level < self.threshold - self.hysteresis
        } else {
            level > self.threshold + self.hysteresis
        };
        if !flipped {
            return None;
        }

        self.state = Some((!on, now_ms));
        if !core::mem::replace(&mut self.bounded, true) {
            return None;
        }
        let duration_ms = u32::try_from(now_ms.saturating_sub(since)).unwrap_or(u32::MAX);
        Some(if on {
            PulseEvent::on(duration_ms)
        } else {
            PulseEvent::off(duration_ms)
        })
    }

}
