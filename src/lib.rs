//! Lightseeker controller library.
//!
//! Light-following steering and Morse light-signal decoding for a small
//! two-sensor wheeled robot. The domain core (`control`, `morse`, `fsm`,
//! `app`) is hardware-agnostic; `adapters` and `drivers` connect it to
//! peripherals or to the simulated arena.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod morse;
