//! Integration tests for the AppService → FSM → ports pipeline.
//!
//! These run on the host and drive the full tick loop (sensor read, FSM,
//! motor output, display, events) with scripted light readings.

use super::mock_hw::{DARK, LIT, MockDisplay, MockHardware, MotorCall, RecordingSink};

use lightseeker::app::commands::AppCommand;
use lightseeker::app::events::AppEvent;
use lightseeker::app::ports::Icon;
use lightseeker::app::service::AppService;
use lightseeker::config::{SystemConfig, UnitMode};
use lightseeker::error::DecodeError;
use lightseeker::fsm::StateId;

const TICK_MS: u64 = 20;
const UNIT_MS: u32 = 100;

fn fixed_unit_config() -> SystemConfig {
    let mut cfg = SystemConfig::default();
    cfg.morse.unit_mode = UnitMode::Fixed;
    cfg.morse.unit_ms = UNIT_MS;
    cfg
}

struct Rig {
    app: AppService,
    hw: MockHardware,
    display: MockDisplay,
    sink: RecordingSink,
}

impl Rig {
    fn new(cfg: SystemConfig) -> Self {
        Self {
            app: AppService::new(cfg).unwrap(),
            hw: MockHardware::new(TICK_MS),
            display: MockDisplay::default(),
            sink: RecordingSink::new(),
        }
    }

    fn started(cfg: SystemConfig) -> Self {
        let mut rig = Self::new(cfg);
        rig.app.start(&mut rig.sink);
        rig
    }

    fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.app.tick(&mut self.hw, &mut self.display, &mut self.sink);
        }
    }

    /// Tick until the scripted readings are used up.
    fn run_script(&mut self) {
        let n = self.hw.script_len();
        self.tick(n);
    }

    fn command(&mut self, cmd: AppCommand) {
        self.app.handle_command(cmd, &mut self.hw, &mut self.sink);
    }

    /// Queue `dots` one-unit flashes with intra-character gaps only, so
    /// they all land in one code.
    fn key_dots(&mut self, dots: usize) {
        let unit_ticks = (u64::from(UNIT_MS) / TICK_MS) as usize;
        for _ in 0..dots {
            self.hw.hold(LIT, DARK, unit_ticks).hold(DARK, DARK, unit_ticks);
        }
    }
}

// ── Seeking ───────────────────────────────────────────────────

#[test]
fn seeking_steers_toward_brighter_side() {
    let mut rig = Rig::started(SystemConfig::default());
    rig.hw.hold(60.0, 20.0, 3);
    rig.run_script();

    match rig.hw.last_call() {
        Some(MotorCall::Power { left, right }) => {
            assert!(right > left, "should turn toward the left, got {left} / {right}");
        }
        other => panic!("expected a power command, got {other:?}"),
    }
    assert_eq!(rig.app.state(), StateId::Seeking);
}

#[test]
fn balanced_light_drives_straight() {
    let mut rig = Rig::started(SystemConfig::default());
    rig.hw.hold(30.0, 30.0, 5);
    rig.run_script();

    let cmd = rig.app.last_command();
    assert!((cmd.left - cmd.right).abs() < 1e-3, "{cmd:?}");
    assert!(cmd.left > 0.0);
}

#[test]
fn arrival_switches_to_decoding_and_stops_motors() {
    let mut rig = Rig::started(fixed_unit_config());
    rig.hw.hold(80.0, 80.0, 5);
    rig.run_script();

    assert_eq!(rig.app.state(), StateId::Decoding);
    assert!(rig.hw.is_stopped());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Arrived { .. })),
        1
    );
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Seeking,
        to: StateId::Decoding,
    }));
}

#[test]
fn seek_timeout_gives_up_and_decodes() {
    let mut cfg = fixed_unit_config();
    cfg.seek_timeout_ms = 1000;
    let mut rig = Rig::started(cfg);
    rig.hw.set_idle(30.0, 30.0);

    rig.tick(49);
    assert_eq!(rig.app.state(), StateId::Seeking);
    rig.tick(1);
    assert_eq!(rig.app.state(), StateId::Decoding);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Arrived { .. })),
        0
    );
}

// ── Full run ──────────────────────────────────────────────────

#[test]
fn seek_arrive_decode_sos_then_show_happy() {
    let mut rig = Rig::started(fixed_unit_config());
    rig.hw.hold(80.0, 80.0, 5);
    rig.hw.hold(DARK, DARK, 10);
    rig.hw.key_morse("SOS", UNIT_MS);
    rig.run_script();

    assert_eq!(rig.app.state(), StateId::Decoding);
    assert_eq!(rig.app.decoding_text(), Some("SO"));
    assert!(rig.app.last_message().is_none());
    assert!(rig.hw.is_stopped());

    // Idle timeout (3 s of darkness after the last pulse) closes the message.
    rig.tick(160);

    let message = rig.app.last_message().expect("message should be finalized");
    assert_eq!(message.as_str(), "SOS");
    assert_eq!(message.anomalies(), 0);
    assert_eq!(rig.display.icons, vec![Icon::Happy]);
    assert_eq!(rig.display.texts, vec!["SOS".to_owned()]);
    // The last letter is completed by the finalizing flush, not by a gap.
    assert_eq!(rig.sink.decoded_chars(), "SO");
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::MessageDecoded(_))),
        1
    );
    assert_eq!(rig.app.state(), StateId::Seeking);
}

#[test]
fn source_still_lit_after_arrival_is_not_a_pulse() {
    let mut rig = Rig::started(fixed_unit_config());
    rig.hw.hold(80.0, 80.0, 5);
    // The beacon stays on past arrival, then goes dark before keying.
    rig.hw.hold(LIT, LIT, 30);
    rig.hw.hold(DARK, DARK, 10);
    rig.hw.key_morse("SOS", UNIT_MS);
    rig.run_script();
    rig.tick(160);

    assert_eq!(
        rig.app.last_message().map(|m| m.as_str().to_owned()),
        Some("SOS".to_owned())
    );
    assert_eq!(rig.sink.decoded_chars(), "SO");
}

#[test]
fn long_lit_lead_in_does_not_fool_the_adaptive_unit() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.app.start_from(StateId::Decoding, &mut rig.sink);
    rig.hw.hold(LIT, DARK, 100);
    rig.hw.hold(DARK, DARK, 35);
    rig.hw.key_morse("SOS", 120);
    rig.run_script();
    rig.tick(200);

    assert_eq!(
        rig.app.last_message().map(|m| m.as_str().to_owned()),
        Some("SOS".to_owned())
    );
}

#[test]
fn words_are_separated_by_one_space() {
    let mut rig = Rig::new(fixed_unit_config());
    rig.app.start_from(StateId::Decoding, &mut rig.sink);
    rig.hw.hold(DARK, DARK, 5);
    rig.hw.key_morse("HI  THERE", UNIT_MS);
    rig.run_script();
    rig.tick(200);

    assert_eq!(
        rig.app.last_message().map(|m| m.as_str().to_owned()),
        Some("HI THERE".to_owned())
    );
}

#[test]
fn adaptive_unit_tracks_the_sender() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.app.start_from(StateId::Decoding, &mut rig.sink);
    rig.hw.hold(DARK, DARK, 5);
    rig.hw.key_morse("SOS", 120);
    rig.run_script();
    rig.tick(200);

    assert_eq!(
        rig.app.last_message().map(|m| m.as_str().to_owned()),
        Some("SOS".to_owned())
    );
}

#[test]
fn garbage_shows_sad_with_placeholder() {
    let mut rig = Rig::new(fixed_unit_config());
    rig.app.start_from(StateId::Decoding, &mut rig.sink);
    rig.hw.hold(DARK, DARK, 5);
    rig.key_dots(8);
    rig.run_script();
    rig.tick(200);

    let message = rig.app.last_message().expect("message should be finalized");
    assert_eq!(message.as_str(), "?");
    assert_eq!(rig.display.icons, vec![Icon::Sad]);
    assert_eq!(rig.display.texts, vec!["?".to_owned()]);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::DecodeAnomaly(DecodeError::BufferOverflow))
    );
}

#[test]
fn silence_never_finalizes() {
    let mut rig = Rig::new(fixed_unit_config());
    rig.app.start_from(StateId::Decoding, &mut rig.sink);
    rig.tick(500);

    assert_eq!(rig.app.state(), StateId::Decoding);
    assert!(rig.app.last_message().is_none());
    assert!(rig.display.icons.is_empty());
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn start_decoding_command_stops_motors() {
    let mut rig = Rig::started(SystemConfig::default());
    rig.hw.hold(30.0, 30.0, 3);
    rig.run_script();
    assert!(!rig.hw.is_stopped());

    rig.command(AppCommand::StartDecoding);

    assert_eq!(rig.app.state(), StateId::Decoding);
    assert_eq!(rig.hw.last_call(), Some(&MotorCall::Stop));
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Seeking,
        to: StateId::Decoding,
    }));
}

#[test]
fn start_seeking_abandons_partial_message() {
    let mut rig = Rig::new(fixed_unit_config());
    rig.app.start_from(StateId::Decoding, &mut rig.sink);
    rig.hw.hold(DARK, DARK, 5);
    rig.hw.key_morse("SOS", UNIT_MS);
    rig.run_script();
    assert_eq!(rig.app.decoding_text(), Some("SO"));

    rig.command(AppCommand::StartSeeking);
    rig.tick(200);

    assert_eq!(rig.app.state(), StateId::Seeking);
    assert!(rig.app.decoding_text().is_none());
    assert!(rig.app.last_message().is_none());
}

#[test]
fn stop_halts_everything() {
    let mut rig = Rig::started(SystemConfig::default());
    rig.hw.set_idle(30.0, 30.0);
    rig.tick(3);

    rig.command(AppCommand::Stop);
    let ticks = rig.app.tick_count();
    let calls = rig.hw.calls.len();
    rig.tick(10);

    assert!(!rig.app.is_running());
    assert_eq!(rig.hw.last_call(), Some(&MotorCall::Stop));
    assert_eq!(rig.app.tick_count(), ticks);
    assert_eq!(rig.hw.calls.len(), calls);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::Stopped), 1);
}

#[test]
fn stopped_service_can_be_restarted() {
    let mut rig = Rig::started(SystemConfig::default());
    rig.command(AppCommand::Stop);
    rig.command(AppCommand::StartSeeking);

    assert!(rig.app.is_running());
    rig.hw.set_idle(30.0, 30.0);
    rig.tick(2);
    assert!(!rig.hw.is_stopped());
}

#[test]
fn config_update_applies_to_next_session() {
    let mut rig = Rig::started(fixed_unit_config());
    let mut cfg = fixed_unit_config();
    cfg.morse.placeholder = '#';
    rig.command(AppCommand::UpdateConfig(cfg));
    assert_eq!(rig.app.current_config().morse.placeholder, '#');

    rig.command(AppCommand::StartDecoding);
    rig.hw.hold(DARK, DARK, 5);
    rig.key_dots(8);
    rig.run_script();
    rig.tick(200);

    assert_eq!(
        rig.app.last_message().map(|m| m.as_str().to_owned()),
        Some("#".to_owned())
    );
}

#[test]
fn invalid_config_update_is_ignored() {
    let mut rig = Rig::started(SystemConfig::default());
    let mut bad = SystemConfig::default();
    bad.morse.idle_timeout_ms = 0;
    rig.command(AppCommand::UpdateConfig(bad));

    assert_eq!(rig.app.current_config(), SystemConfig::default());
    assert!(rig.app.is_running());
}
