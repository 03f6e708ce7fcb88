//! Fuzz target: `DecodeSession`
//!
//! Interprets the input as a stream of light readings (one byte per
//! tick, 0..=255 scaled to 0..100 %) and drives them through the
//! level-driven decode path. Asserts that it never panics and that the
//! finished message respects its capacity and spacing rules.
//!
//! cargo fuzz run fuzz_pulse_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use lightseeker::config::{MorseConfig, UnitMode};
use lightseeker::morse::assembler::MESSAGE_CAPACITY;
use lightseeker::morse::session::DecodeSession;

fuzz_target!(|data: &[u8]| {
    let Some((&mode, levels)) = data.split_first() else {
        return;
    };
    let cfg = MorseConfig {
        unit_mode: if mode & 1 == 0 { UnitMode::Adaptive } else { UnitMode::Fixed },
        unit_ms: 40 + u32::from(mode >> 1) * 4,
        ..MorseConfig::default()
    };

    let mut session = DecodeSession::new(&cfg, 0);
    for (i, &b) in levels.iter().enumerate() {
        let now = (i as u64 + 1) * 20;
        session.feed_level(f32::from(b) * 100.0 / 255.0, now);
        if session.is_idle(now) {
            break;
        }
    }

    let message = session.finalize();
    assert!(message.as_str().len() <= MESSAGE_CAPACITY);
    assert!(!message.as_str().starts_with(' '));
    assert!(!message.as_str().ends_with(' '));
});
