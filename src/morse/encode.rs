//! Text → Morse pulse timings.
//!
//! Standard spacing: dot 1 unit, dash 3, element gap 1, character gap 3,
//! word gap 7. Characters without a code are skipped; runs of whitespace
//! collapse to one word gap. The sequence ends on the last ON pulse.

use super::{PulseEvent, table};

pub fn encode(text: &str, unit_ms: u32) -> Vec<PulseEvent> {
    let mut pulses = Vec::new();
    for word in text.split_whitespace() {
        let mut word_started = false;
        for code in word.chars().filter_map(table::code_for) {
            let gap = if word_started {
                3
            } else if pulses.is_empty() {
                0
            } else {
                7
            };
            if gap > 0 {
                pulses.push(PulseEvent::off(gap * unit_ms));
            }
            word_started = true;

            for (i, element) in code.chars().enumerate() {
                if i > 0 {
                    pulses.push(PulseEvent::off(unit_ms));
                }
                let len = if element == '-' { 3 } else { 1 };
                pulses.push(PulseEvent::on(len * unit_ms));
            }
        }
    }
    pulses
}
