//! Closed-loop control: the PID core and the light-following steering
//! policy built on top of it.

pub mod pid;
pub mod steering;
