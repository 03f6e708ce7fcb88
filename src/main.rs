//! Lightseeker — host simulation entry point.
//!
//! Runs the controller against a simulated arena: the robot seeks the
//! light source, stops in front of it, and reads back the message the
//! source keys in Morse.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  SimulatedArena        LogDisplay     LogEventSink         │
//! │  (Sensor+Motor+Clock)  (Display)      (EventSink)          │
//! │  JsonConfigFile                                            │
//! │  (Config)                                                  │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────────  │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │              AppService (pure logic)                 │  │
//! │  │  FSM · Steering PID · Morse decoder                  │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use lightseeker::adapters::config_file::JsonConfigFile;
use lightseeker::adapters::log_sink::{LogDisplay, LogEventSink};
use lightseeker::adapters::sim::{ArenaConfig, SimulatedArena};
use lightseeker::app::commands::AppCommand;
use lightseeker::app::ports::{ClockPort, ConfigPort, MotorPort};
use lightseeker::app::service::AppService;
use lightseeker::fsm::StateId;

// ── CLI ───────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lightseeker-sim")]
#[command(version, about = "Simulated light-seeking run with Morse readback", long_about = None)]
struct Cli {
    /// JSON configuration file (missing file means defaults)
    #[arg(long, default_value = "lightseeker.json")]
    config: PathBuf,

    /// Message the light source keys once the robot has stopped
    #[arg(long, default_value = "SOS")]
    message: String,

    /// Morse unit used by the transmitter, in milliseconds
    #[arg(long, default_value = "120")]
    unit_ms: u32,

    /// Give up after this many simulated seconds
    #[arg(long, default_value = "90")]
    max_secs: u64,

    /// Start next to the source and go straight to decoding
    #[arg(long)]
    skip_seek: bool,

    /// Robot start position, x (metres from the source)
    #[arg(long, default_value = "1.2", allow_hyphen_values = true)]
    start_x: f32,

    /// Robot start position, y (metres from the source)
    #[arg(long, default_value = "0.5", allow_hyphen_values = true)]
    start_y: f32,

    /// Robot start heading in degrees, counter-clockwise from +x
    #[arg(long, default_value = "180", allow_hyphen_values = true)]
    start_heading_deg: f32,

    /// Sleep for each control tick so the run takes wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    // ── Configuration ─────────────────────────────────────────
    let config_file = JsonConfigFile::new(&cli.config);
    let config = config_file
        .load()
        .with_context(|| format!("loading {}", config_file.path().display()))?;
    let tick_ms = config.control_loop_interval_ms;
    info!(
        "Lightseeker sim: tick={}ms seek_timeout={}ms unit_mode={:?}",
        tick_ms, config.seek_timeout_ms, config.morse.unit_mode
    );

    let mut app = AppService::new(config).context("invalid configuration")?;

    // ── Adapters ──────────────────────────────────────────────
    let arena_cfg = if cli.skip_seek {
        ArenaConfig {
            start_x: 0.15,
            start_y: 0.0,
            start_heading: std::f32::consts::PI,
            ..ArenaConfig::default()
        }
    } else {
        ArenaConfig {
            start_x: cli.start_x,
            start_y: cli.start_y,
            start_heading: cli.start_heading_deg.to_radians(),
            ..ArenaConfig::default()
        }
    };
    let mut arena = SimulatedArena::new(arena_cfg, &cli.message, cli.unit_ms, tick_ms);
    let mut display = LogDisplay::new();
    let mut sink = LogEventSink::new();

    // ── Run ───────────────────────────────────────────────────
    let initial = if cli.skip_seek {
        // Parked: the transmitter's countdown starts with the first tick.
        arena.stop();
        StateId::Decoding
    } else {
        StateId::Seeking
    };
    app.start_from(initial, &mut sink);

    let deadline_ms = cli.max_secs.saturating_mul(1000);
    while app.last_message().is_none() && arena.now_ms() < deadline_ms {
        app.tick(&mut arena, &mut display, &mut sink);
        if cli.realtime {
            std::thread::sleep(Duration::from_millis(u64::from(tick_ms)));
        }
    }
    let partial = app.decoding_text().map(str::to_owned);
    app.handle_command(AppCommand::Stop, &mut arena, &mut sink);

    let (x, y) = arena.position();
    info!(
        "Run finished after {} ticks ({} ms simulated), robot at ({:.2}, {:.2}) heading {:.0}°, {:.2} m from the source",
        app.tick_count(),
        arena.now_ms(),
        x,
        y,
        arena.heading().to_degrees(),
        arena.distance_to_source()
    );

    let Some(message) = app.last_message() else {
        if let Some(partial) = partial {
            warn!("Partial text when time ran out: \"{}\"", partial);
        }
        bail!("no message decoded within {} s", cli.max_secs);
    };

    println!("{message}");
    if message.as_str() != cli.message.trim().to_uppercase() {
        warn!(
            "Decoded \"{}\" but the transmitter sent \"{}\"",
            message, cli.message
        );
    }
    Ok(())
}
