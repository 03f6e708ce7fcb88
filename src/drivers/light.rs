//! Ambient light sensor front end.
//!
//! Converts raw readings into a 0–100 % intensity using a two-point
//! calibration (dark and bright raw counts). The raw read is a closure so
//! any ADC, I²C lux sensor, or colour sensor can sit behind it.

use crate::error::SensorError;

/// A light sensor that reports intensity in percent.
pub trait AmbientLight {
    fn read_percent(&mut self) -> Result<f32, SensorError>;
}

/// Raw counts mapped linearly between a dark and a bright reference.
pub struct CalibratedLightSensor<R> {
    read_raw: R,
    dark_raw: f32,
    bright_raw: f32,
}

impl<R> CalibratedLightSensor<R>
where
    R: FnMut() -> Result<u16, SensorError>,
{
    pub fn new(read_raw: R, dark_raw: u16, bright_raw: u16) -> Self {
        Self {
            read_raw,
            dark_raw: f32::from(dark_raw),
            bright_raw: f32::from(bright_raw),
        }
    }

    /// Replace the calibration references.
    pub fn calibrate(&mut self, dark_raw: u16, bright_raw: u16) {
        self.dark_raw = f32::from(dark_raw);
        self.bright_raw = f32::from(bright_raw);
    }
}

impl<R> AmbientLight for CalibratedLightSensor<R>
where
    R: FnMut() -> Result<u16, SensorError>,
{
    fn read_percent(&mut self) -> Result<f32, SensorError> {
        let raw = f32::from((self.read_raw)()?);
        let span = self.bright_raw - self.dark_raw;
        if span.abs() < f32::EPSILON {
            return Err(SensorError::OutOfRange);
        }
        Ok(((raw - self.dark_raw) / span * 100.0).clamp(0.0, 100.0))
    }
}
