//! End-to-end runs against the simulated arena.

use std::f32::consts::PI;

use super::mock_hw::RecordingSink;

use lightseeker::adapters::log_sink::LogDisplay;
use lightseeker::adapters::sim::{ArenaConfig, SimulatedArena, Transmitter};
use lightseeker::app::ports::{ClockPort, Icon, MotorPort};
use lightseeker::app::service::AppService;
use lightseeker::config::SystemConfig;
use lightseeker::fsm::StateId;

const TICK_MS: u32 = 20;

fn parked_arena(message: &str, unit_ms: u32) -> SimulatedArena {
    let cfg = ArenaConfig {
        start_x: 0.15,
        start_y: 0.0,
        start_heading: PI,
        ..ArenaConfig::default()
    };
    let mut arena = SimulatedArena::new(cfg, message, unit_ms, TICK_MS);
    arena.stop();
    arena
}

fn run_until_message(
    app: &mut AppService,
    arena: &mut SimulatedArena,
    display: &mut LogDisplay,
    sink: &mut RecordingSink,
    limit_ms: u64,
) {
    while app.last_message().is_none() && arena.now_ms() < limit_ms {
        app.tick(arena, display, sink);
    }
}

#[test]
fn parked_robot_reads_the_beacon_message() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut arena = parked_arena("SOS", 120);
    let mut display = LogDisplay::new();
    let mut sink = RecordingSink::new();

    app.start_from(StateId::Decoding, &mut sink);
    run_until_message(&mut app, &mut arena, &mut display, &mut sink, 30_000);

    assert_eq!(arena.transmitter(), Transmitter::Done);
    assert_eq!(app.last_message().map(|m| m.as_str()), Some("SOS"));
    assert_eq!(display.icon(), Some(Icon::Happy));
    assert_eq!(display.text(), "SOS");
}

#[test]
fn parked_robot_reads_two_words() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut arena = parked_arena("HELLO WORLD", 100);
    let mut display = LogDisplay::new();
    let mut sink = RecordingSink::new();

    app.start_from(StateId::Decoding, &mut sink);
    run_until_message(&mut app, &mut arena, &mut display, &mut sink, 60_000);

    assert_eq!(
        app.last_message().map(|m| m.as_str()),
        Some("HELLO WORLD")
    );
}

#[test]
fn seeking_closes_on_the_source() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut arena = SimulatedArena::new(ArenaConfig::default(), "E", 120, TICK_MS);
    let mut display = LogDisplay::new();
    let mut sink = RecordingSink::new();
    let start = arena.distance_to_source();

    app.start(&mut sink);
    for _ in 0..150 {
        app.tick(&mut arena, &mut display, &mut sink);
    }

    assert!(
        arena.distance_to_source() < start - 0.1,
        "robot did not approach: {} -> {}",
        start,
        arena.distance_to_source()
    );
}
