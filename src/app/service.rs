//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM and its shared context. It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService        │
//!   MotorPort ◀── │  FSM · Steering · Morse  │ ──▶ DisplayPort
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::ConfigError;
use crate::fsm::context::{FsmContext, SteeringCommand};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::morse::assembler::DecodedMessage;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, Icon, MotorPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    tick_count: u64,
    last_message: Option<DecodedMessage>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// An invalid configuration is the one fatal error in the system and
    /// is reported here, before anything moves. Does **not** start the
    /// FSM; call [`start`](Self::start) or [`start_from`](Self::start_from).
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Seeking);
        Ok(Self {
            fsm,
            ctx,
            tick_count: 0,
            last_message: None,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its default initial state (Seeking).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.start_from(StateId::Seeking, sink);
    }

    /// Start the FSM directly in `state` (e.g. a robot already parked in
    /// front of the transmitter).
    pub fn start_from(&mut self, state: StateId, sink: &mut impl EventSink) {
        self.fsm.restart(state, &mut self.ctx);
        sink.emit(&AppEvent::Started(state));
        info!("AppService started in {:?}", state);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read sensors → FSM → motors → display.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`MotorPort`]; this avoids a double mutable borrow while keeping the
    /// port boundary explicit. A stopped service does nothing.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + MotorPort),
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        if !self.fsm.is_running() {
            return;
        }
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Read sensors via SensorPort
        let sample = hw.read_light();
        self.ctx.sample = sample;
        self.ctx.now_ms = sample.timestamp_ms;

        // 2. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 3. Apply the motor command via MotorPort
        self.apply_motors(hw);

        // 4. Report what happened this tick
        self.drain_outbox(display, sink);

        // 5. Emit state change if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command at a tick boundary.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl MotorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::StartSeeking => self.switch_to(StateId::Seeking, hw, sink),
            AppCommand::StartDecoding => self.switch_to(StateId::Decoding, hw, sink),
            AppCommand::Stop => {
                if self.fsm.is_running() {
                    self.fsm.halt(&mut self.ctx);
                    hw.stop();
                    sink.emit(&AppEvent::Stopped);
                }
            }
            AppCommand::UpdateConfig(new_config) => match new_config.validate() {
                Ok(()) => {
                    self.ctx.apply_config(new_config);
                    info!("Configuration updated at runtime");
                }
                Err(e) => warn!("Rejected configuration update: {}", e),
            },
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Whether the service is ticking (not stopped).
    pub fn is_running(&self) -> bool {
        self.fsm.is_running()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The motor command applied on the last tick.
    pub fn last_command(&self) -> SteeringCommand {
        self.ctx.command
    }

    /// Text of the session currently being decoded, if any.
    pub fn decoding_text(&self) -> Option<&str> {
        self.ctx.session.as_ref().map(|s| s.text())
    }

    /// The most recently finalized message.
    pub fn last_message(&self) -> Option<&DecodedMessage> {
        self.last_message.as_ref()
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> SystemConfig {
        self.ctx.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    fn switch_to(&mut self, target: StateId, hw: &mut impl MotorPort, sink: &mut impl EventSink) {
        let was_running = self.fsm.is_running();
        let prev = self.fsm.current_state();
        self.fsm.restart(target, &mut self.ctx);
        self.apply_motors(hw);
        if !was_running || prev != target {
            sink.emit(&AppEvent::StateChanged {
                from: prev,
                to: target,
            });
        }
    }

    /// Translate the FSM motor command into port calls.
    fn apply_motors(&self, hw: &mut impl MotorPort) {
        let cmd = self.ctx.command;
        if cmd.is_stopped() {
            hw.stop();
        } else {
            hw.set_power(cmd.left, cmd.right);
        }
    }

    /// Turn the context outbox into events and display output.
    fn drain_outbox(&mut self, display: &mut impl DisplayPort, sink: &mut impl EventSink) {
        if core::mem::take(&mut self.ctx.arrived) {
            sink.emit(&AppEvent::Arrived {
                magnitude: self.ctx.sample.magnitude(),
            });
        }
        if let Some(c) = self.ctx.decoded.take() {
            sink.emit(&AppEvent::SymbolDecoded(c));
        }
        for anomaly in self.ctx.anomalies.iter() {
            sink.emit(&AppEvent::DecodeAnomaly(*anomaly));
        }
        self.ctx.anomalies.clear();

        if let Some(message) = self.ctx.finished.take() {
            self.render(&message, display);
            sink.emit(&AppEvent::MessageDecoded(message.clone()));
            self.last_message = Some(message);
        }
    }

    fn render(&self, message: &DecodedMessage, display: &mut impl DisplayPort) {
        if message.has_content(self.ctx.config.morse.placeholder) {
            display.show_icon(Icon::Happy);
        } else {
            display.show_icon(Icon::Sad);
        }
        if !message.is_empty() {
            display.show_text(message.as_str());
        }
    }
}
