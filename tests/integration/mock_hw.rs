//! Mock hardware adapter for integration tests.
//!
//! Plays back a script of light readings and records every motor call so
//! tests can assert on the full command history without real peripherals.

use std::collections::VecDeque;

use lightseeker::app::events::AppEvent;
use lightseeker::app::ports::{DisplayPort, EventSink, Icon, MotorPort, SensorPort};
use lightseeker::fsm::context::LightSample;
use lightseeker::morse::encode::encode;

/// Reading for a lit Morse source.
pub const LIT: f32 = 90.0;
/// Reading for a dark room.
pub const DARK: f32 = 5.0;

// ── Motor call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorCall {
    Power { left: f32, right: f32 },
    Stop,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    script: VecDeque<(f32, f32)>,
    /// Reading repeated once the script runs out.
    idle: (f32, f32),
    tick_ms: u64,
    now_ms: u64,
    pub calls: Vec<MotorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            script: VecDeque::new(),
            idle: (DARK, DARK),
            tick_ms,
            now_ms: 0,
            calls: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn set_idle(&mut self, left: f32, right: f32) {
        self.idle = (left, right);
    }

    /// Queue `ticks` identical readings.
    pub fn hold(&mut self, left: f32, right: f32, ticks: usize) -> &mut Self {
        self.script.extend(std::iter::repeat_n((left, right), ticks));
        self
    }

    /// Queue `text` keyed in Morse on the left sensor, one reading per
    /// tick, with the right sensor dark.
    pub fn key_morse(&mut self, text: &str, unit_ms: u32) -> &mut Self {
        for pulse in encode(text, unit_ms) {
            let ticks = (u64::from(pulse.duration_ms) / self.tick_ms) as usize;
            let level = if pulse.is_on { LIT } else { DARK };
            self.hold(level, DARK, ticks);
        }
        self
    }

    pub fn script_len(&self) -> usize {
        self.script.len()
    }

    pub fn last_call(&self) -> Option<&MotorCall> {
        self.calls.last()
    }

    pub fn is_stopped(&self) -> bool {
        match self.last_call() {
            None | Some(MotorCall::Stop) => true,
            Some(MotorCall::Power { left, right }) => *left == 0.0 && *right == 0.0,
        }
    }
}

impl SensorPort for MockHardware {
    fn read_light(&mut self) -> LightSample {
        self.now_ms += self.tick_ms;
        let (left, right) = self.script.pop_front().unwrap_or(self.idle);
        LightSample::new(left, right, self.now_ms)
    }
}

impl MotorPort for MockHardware {
    fn set_power(&mut self, left: f32, right: f32) {
        self.calls.push(MotorCall::Power { left, right });
    }

    fn stop(&mut self) {
        self.calls.push(MotorCall::Stop);
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub texts: Vec<String>,
    pub icons: Vec<Icon>,
}

impl DisplayPort for MockDisplay {
    fn show_text(&mut self, text: &str) {
        self.texts.push(text.to_owned());
    }

    fn show_icon(&mut self, icon: Icon) {
        self.icons.push(icon);
    }
}

// ── Event sink that stores events ─────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Characters reported through `SymbolDecoded`, in order.
    pub fn decoded_chars(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::SymbolDecoded(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
