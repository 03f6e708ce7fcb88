//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements            | Connects to                  |
//! |----------------|-----------------------|------------------------------|
//! | `config_file`  | ConfigPort            | JSON file on disk            |
//! | `hardware`     | SensorPort, MotorPort | light sensors, H-bridges     |
//! | `log_sink`     | EventSink, DisplayPort| `log` output                 |
//! | `sim`          | SensorPort, MotorPort | simulated arena              |
//! |                | ClockPort             |                              |
//! | `time`         | ClockPort             | `std::time::Instant`         |

pub mod config_file;
pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
