//! Utility re-exports for the IMX185 core.
//!
//! - `controllers`: register codec, control translation, streaming and power
//!   sequencing for the sensor
//! - `math`: the fixed-point value domain of control values
//! - `config`: per-sensor configuration

pub mod config;
pub mod controllers;
pub mod math;

pub use config::SensorConfig;
pub use controllers::{SensorCommand, SensorController, SENSOR_CHANNEL};
pub use embassy_time::Duration;
pub use math::fixed_point::{FixedPoint, FIXED_POINT_SCALING_FACTOR};
