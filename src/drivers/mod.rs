//! Peripheral drivers for the light sensors and drive motors.

pub mod light;
pub mod motor;
