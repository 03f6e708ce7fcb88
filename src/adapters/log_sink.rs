//! Log-based event sink and display adapters.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` on a host). [`LogDisplay`]
//! stands in for the light matrix when none is attached.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink, Icon};

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Arrived { magnitude } => {
                info!("SEEK  | arrived, magnitude={:.1}", magnitude);
            }
            AppEvent::SymbolDecoded(c) => {
                info!("MORSE | '{}'", c);
            }
            AppEvent::DecodeAnomaly(e) => {
                warn!("MORSE | anomaly: {}", e);
            }
            AppEvent::MessageDecoded(msg) => {
                info!(
                    "MORSE | message \"{}\" ({} anomalies)",
                    msg,
                    msg.anomalies()
                );
            }
            AppEvent::Stopped => {
                info!("STOP  | motors off");
            }
        }
    }
}

/// Display adapter that logs what would be shown and remembers it.
#[derive(Default)]
pub struct LogDisplay {
    text: String,
    icon: Option<Icon>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently "on screen".
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn icon(&self) -> Option<Icon> {
        self.icon
    }
}

impl DisplayPort for LogDisplay {
    fn show_text(&mut self, text: &str) {
        info!("DISPLAY | text \"{}\"", text);
        self.text.clear();
        self.text.push_str(text);
    }

    fn show_icon(&mut self, icon: Icon) {
        info!("DISPLAY | icon {:?}", icon);
        self.icon = Some(icon);
    }
}
